//! Ray casting against collision surfaces.
//!
//! A [`RayQuery`] describes the parametric segment `origin + direction * t`.
//! The direction is deliberately not normalised: with `max_param = 1.0` the
//! segment ends exactly at `origin + direction`, which is how the projection
//! engine spans source to target.

use serde::{Deserialize, Serialize};

use super::mesh::{PolyMesh, Triangle3};
use super::{Point3, Tolerance, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayQuery {
    pub origin: Point3,
    pub direction: Vec3,
    pub max_param: f64,
    pub test_both_directions: bool,
    pub tolerance: Tolerance,
}

impl RayQuery {
    /// Forward-only query over `t` in `[0, 1]`.
    #[must_use]
    pub const fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            max_param: 1.0,
            test_both_directions: false,
            tolerance: Tolerance::DEFAULT,
        }
    }

    #[must_use]
    pub const fn with_max_param(mut self, max_param: f64) -> Self {
        self.max_param = max_param;
        self
    }

    #[must_use]
    pub const fn with_both_directions(mut self, both: bool) -> Self {
        self.test_both_directions = both;
        self
    }

    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Eligible parameter interval `(t_min, t_max)`. Only meaningful for a
    /// query that is not [degenerate](Self::is_degenerate).
    #[must_use]
    pub fn param_range(&self) -> (f64, f64) {
        if self.test_both_directions {
            (-self.max_param, self.max_param)
        } else {
            (0.0, self.max_param)
        }
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    /// A query that can never produce hits: non-finite values, a negative
    /// `max_param` or a direction without length.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !self.origin.is_finite()
            || !self.direction.is_finite()
            || !self.max_param.is_finite()
            || self.max_param < 0.0
            || Tolerance::ZERO_LENGTH.is_zero_vec3(self.direction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    pub point: Point3,
    pub face_index: usize,
    pub ray_param: f64,
}

/// Surface that can be queried with rays.
///
/// Implementations report every crossing inside the query's parameter range
/// in any order they like; callers that need a first hit go through
/// [`cast_ray`].
pub trait RaySurface: Send + Sync {
    fn intersect(&self, query: &RayQuery) -> Vec<HitRecord>;

    /// World-space unit normal of a face, `None` if unknown or degenerate.
    fn face_normal(&self, face_index: usize) -> Option<Vec3>;
}

/// Ordering applied to the hits of a query before the first one is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitOrder {
    /// Smallest `|ray_param|`; on an exact tie the forward hit wins, then the
    /// lower face index.
    #[default]
    Nearest,
    /// Smallest signed `ray_param`, then the lower face index.
    Signed,
    /// Whatever order the surface returned.
    Provider,
}

impl HitOrder {
    /// Parse a user-facing name, case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "nearest" | "closest" => Some(Self::Nearest),
            "signed" => Some(Self::Signed),
            "provider" | "surface" | "legacy" => Some(Self::Provider),
            _ => None,
        }
    }

    pub fn sort(self, hits: &mut [HitRecord]) {
        match self {
            Self::Nearest => hits.sort_by(|a, b| {
                a.ray_param
                    .abs()
                    .total_cmp(&b.ray_param.abs())
                    .then_with(|| (a.ray_param < 0.0).cmp(&(b.ray_param < 0.0)))
                    .then_with(|| a.face_index.cmp(&b.face_index))
            }),
            Self::Signed => hits.sort_by(|a, b| {
                a.ray_param
                    .total_cmp(&b.ray_param)
                    .then_with(|| a.face_index.cmp(&b.face_index))
            }),
            Self::Provider => {}
        }
    }
}

/// Intersect `query` with `surface` and order the hits by `order`.
#[must_use]
pub fn cast_ray(surface: &dyn RaySurface, query: &RayQuery, order: HitOrder) -> Vec<HitRecord> {
    if query.is_degenerate() {
        return Vec::new();
    }
    let mut hits = surface.intersect(query);
    hits.retain(|hit| hit.ray_param.is_finite());
    order.sort(&mut hits);
    hits
}

impl RaySurface for PolyMesh {
    fn intersect(&self, query: &RayQuery) -> Vec<HitRecord> {
        if query.is_degenerate() {
            return Vec::new();
        }
        let Some(bvh) = self.bvh() else {
            return Vec::new();
        };

        let tol = query.tolerance;
        let (t_min, t_max) = query.param_range();
        let mut hits = Vec::new();

        bvh.query_ray(
            query.origin,
            query.direction,
            t_min - tol.eps,
            t_max + tol.eps,
            tol.eps,
            |tri_index| {
                let tri = self.triangle(tri_index);
                if let Some(t) = ray_triangle_param(query.origin, query.direction, tri, tol) {
                    if t >= t_min - tol.eps && t <= t_max + tol.eps {
                        let t = t.clamp(t_min, t_max);
                        hits.push(HitRecord {
                            point: query.point_at(t),
                            face_index: self.face_triangle(tri_index).face as usize,
                            ray_param: t,
                        });
                    }
                }
                true
            },
        );

        // A ray through the diagonal of a fanned polygon hits two of its
        // triangles at the same parameter.
        hits.sort_by(|a, b| {
            a.face_index
                .cmp(&b.face_index)
                .then_with(|| a.ray_param.total_cmp(&b.ray_param))
        });
        hits.dedup_by(|next, kept| {
            next.face_index == kept.face_index && (next.ray_param - kept.ray_param).abs() <= tol.eps
        });
        hits
    }

    fn face_normal(&self, face_index: usize) -> Option<Vec3> {
        self.polygon_normal(face_index)
    }
}

/// Möller–Trumbore without a sign restriction on `t`; the caller applies the
/// parameter range.
fn ray_triangle_param(origin: Point3, dir: Vec3, tri: Triangle3, tol: Tolerance) -> Option<f64> {
    let edge1 = tri.b.sub_point(tri.a);
    let edge2 = tri.c.sub_point(tri.a);
    let h = dir.cross(edge2);
    let det = edge1.dot(h);
    let det_eps = tol.eps * edge1.length() * h.length();
    if !det.is_finite() || det.abs() <= det_eps {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin.sub_point(tri.a);
    let u = inv_det * s.dot(h);
    if u < -tol.eps || u > 1.0 + tol.eps {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * dir.dot(q);
    if v < -tol.eps || u + v > 1.0 + tol.eps {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    t.is_finite().then_some(t)
}
