//! Polygon mesh used as the collision surface for projection queries.
//!
//! Faces are arbitrary polygons (three or more vertex indices). For ray
//! queries every face is fan-triangulated once at construction time and the
//! triangles are indexed by a [`Bvh`]; hits always report the index of the
//! originating polygon, never the triangle.

use super::bvh::Bvh;
use super::{BBox, Point3, Tolerance, Vec3};

/// Triangle produced by fan-triangulating a polygon face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FaceTriangle {
    pub face: u32,
    pub indices: [u32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Triangle3 {
    pub a: Point3,
    pub b: Point3,
    pub c: Point3,
}

impl Triangle3 {
    #[must_use]
    pub const fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self { a, b, c }
    }

    #[must_use]
    pub fn bbox(self) -> BBox {
        BBox::new(self.a, self.a).expand_point(self.b).expand_point(self.c)
    }
}

/// Read-only polygon mesh with per-face normals and a ray acceleration
/// structure.
#[derive(Debug, Clone, Default)]
pub struct PolyMesh {
    vertices: Vec<Point3>,
    faces: Vec<Vec<u32>>,
    face_normals: Vec<Option<Vec3>>,
    triangles: Vec<FaceTriangle>,
    bbox: Option<BBox>,
    bvh: Option<Bvh>,
}

impl PolyMesh {
    /// Mesh without faces. Every ray query against it misses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a mesh from vertex positions and polygon faces.
    ///
    /// An empty face list is accepted and produces a mesh that never reports
    /// hits. Faces with fewer than three indices, out-of-range indices and
    /// non-finite vertices are rejected.
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<Vec<u32>>) -> Result<Self, MeshError> {
        let vertices: Vec<Point3> = vertices.into_iter().map(Point3::from).collect();

        if let Some(index) = vertices.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFiniteVertex { index });
        }

        for (face, indices) in faces.iter().enumerate() {
            if indices.len() < 3 {
                return Err(MeshError::FaceTooSmall {
                    face,
                    len: indices.len(),
                });
            }
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(MeshError::InvalidIndex {
                    face,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }

        let face_normals = faces
            .iter()
            .map(|indices| newell_normal(&vertices, indices))
            .collect();

        let mut triangles = Vec::new();
        for (face, indices) in faces.iter().enumerate() {
            let anchor = indices[0];
            for pair in indices[1..].windows(2) {
                triangles.push(FaceTriangle {
                    face: face as u32,
                    indices: [anchor, pair[0], pair[1]],
                });
            }
        }

        let mut mesh = Self {
            vertices,
            faces,
            face_normals,
            triangles,
            bbox: None,
            bvh: None,
        };

        let tri_bboxes: Vec<BBox> = (0..mesh.triangles.len())
            .map(|i| mesh.triangle(i).bbox().expand_by(Tolerance::DEFAULT.eps))
            .collect();
        mesh.bbox = BBox::from_points(&mesh.vertices);
        mesh.bvh = Bvh::build(&tri_bboxes);

        log::debug!(
            "polymesh: {} vertices, {} faces, {} triangles",
            mesh.vertices.len(),
            mesh.faces.len(),
            mesh.triangles.len()
        );

        Ok(mesh)
    }

    /// Build a mesh from a flat triangle index list (`len % 3 == 0`).
    pub fn from_triangles(vertices: Vec<[f64; 3]>, indices: &[u32]) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::NotTriangleList { len: indices.len() });
        }
        let faces = indices.chunks_exact(3).map(<[u32]>::to_vec).collect();
        Self::new(vertices, faces)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    #[must_use]
    pub fn faces(&self) -> &[Vec<u32>] {
        &self.faces
    }

    /// Axis-aligned bounds of all vertices, `None` for a mesh without vertices.
    #[must_use]
    pub fn bbox(&self) -> Option<BBox> {
        self.bbox
    }

    /// Unit normal of a polygon face following its winding (right-hand rule).
    /// `None` for unknown faces and for faces with zero area.
    #[must_use]
    pub fn polygon_normal(&self, face: usize) -> Option<Vec3> {
        self.face_normals.get(face).copied().flatten()
    }

    pub(crate) fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    pub(crate) fn face_triangle(&self, index: usize) -> FaceTriangle {
        self.triangles[index]
    }

    pub(crate) fn triangle(&self, index: usize) -> Triangle3 {
        let [a, b, c] = self.triangles[index].indices;
        Triangle3::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }
}

/// Newell's method, robust for non-planar and concave polygons.
fn newell_normal(vertices: &[Point3], indices: &[u32]) -> Option<Vec3> {
    let mut n = Vec3::ZERO;
    for (i, &current) in indices.iter().enumerate() {
        let next = indices[(i + 1) % indices.len()];
        let p = vertices[current as usize];
        let q = vertices[next as usize];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    if Tolerance::ZERO_LENGTH.is_zero_vec3(n) {
        return None;
    }
    n.normalized()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("vertex {index} has non-finite coordinates")]
    NonFiniteVertex { index: usize },
    #[error("face {face} has {len} indices, at least 3 are required")]
    FaceTooSmall { face: usize, len: usize },
    #[error("face {face} references vertex {index} but the mesh has {vertex_count} vertices")]
    InvalidIndex {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("triangle index list has length {len}, which is not a multiple of 3")]
    NotTriangleList { len: usize },
}
