mod bvh;
mod core;
mod frame;
mod mesh;
mod projection;
mod raycast;

pub use core::{BBox, Point3, Tolerance, Transform, Vec3, translation_of};
pub use frame::{FrameReference, SurfaceFrame};
pub use mesh::{MeshError, PolyMesh};
pub use projection::{
    NO_HIT_ALIGNMENT, NO_HIT_ORIENTATION, ProjectionDiagnostics, ProjectionMode,
    ProjectionOptions, ProjectionRequest, ProjectionResult, project, project_batch,
    project_with_diagnostics, project_with_options,
};
pub use raycast::{HitOrder, HitRecord, RayQuery, RaySurface, cast_ray};

#[cfg(test)]
mod tests;
