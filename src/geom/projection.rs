//! Surface-snapping projection.
//!
//! Moves an object from a source transform toward a target transform and
//! snaps the path to the first surface it crosses. In oriented mode the
//! result also carries a surface-aligned orientation and a signed alignment
//! score telling from which side the source approaches the surface.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::frame::{FrameReference, SurfaceFrame};
use super::raycast::{HitOrder, HitRecord, RayQuery, RaySurface, cast_ray};
use super::{Point3, Tolerance, Transform, Vec3, translation_of};

/// Orientation reported when no frame could be built.
pub const NO_HIT_ORIENTATION: Vec3 = Vec3::ZERO;
/// Alignment reported when no frame could be built.
pub const NO_HIT_ALIGNMENT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Position only, forward ray search.
    PositionOnly,
    /// Position, orientation and alignment, ray search in both directions.
    #[default]
    Oriented,
}

impl ProjectionMode {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "position" | "position_only" => Some(Self::PositionOnly),
            "oriented" | "orientation" => Some(Self::Oriented),
            _ => None,
        }
    }

    #[must_use]
    pub const fn default_both_directions(self) -> bool {
        matches!(self, Self::Oriented)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionOptions {
    pub mode: ProjectionMode,
    pub hit_order: HitOrder,
    /// Intersection slack, must be positive.
    pub tolerance: f64,
    /// Overrides the mode's ray direction policy when set.
    pub test_both_directions: Option<bool>,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::Oriented,
            hit_order: HitOrder::Nearest,
            tolerance: Tolerance::DEFAULT.eps,
            test_both_directions: None,
        }
    }
}

impl ProjectionOptions {
    #[must_use]
    pub fn position_only() -> Self {
        Self {
            mode: ProjectionMode::PositionOnly,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn oriented() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn both_directions(&self) -> bool {
        self.test_both_directions
            .unwrap_or_else(|| self.mode.default_both_directions())
    }

    /// The configured tolerance, or the default when it is not a positive
    /// finite number.
    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        if self.tolerance.is_finite() && self.tolerance > 0.0 {
            Tolerance::new(self.tolerance)
        } else {
            Tolerance::DEFAULT
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub position: Point3,
    /// XYZ Euler angles in degrees. `None` in position-only mode.
    pub orientation: Option<Vec3>,
    /// `None` in position-only mode.
    pub alignment: Option<f64>,
    /// Effective displacement, re-targeted to the hit point on a hit.
    pub delta: Vec3,
    pub hit: Option<HitRecord>,
}

impl ProjectionResult {
    #[must_use]
    pub fn is_snapped(&self) -> bool {
        self.hit.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectionDiagnostics {
    pub surface_present: bool,
    /// Source and target coincide (or are not finite), no ray was cast.
    pub degenerate_direction: bool,
    pub hit_count: usize,
    pub frame_reference: Option<FrameReference>,
    /// A hit was found but its face had no usable normal.
    pub normal_unavailable: bool,
}

/// One independent evaluation for [`project_batch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionRequest {
    pub source: Transform,
    pub target: Transform,
    pub blend: f64,
}

/// Oriented projection with default options.
#[must_use]
pub fn project(
    source: Transform,
    target: Transform,
    blend: f64,
    surface: Option<&dyn RaySurface>,
) -> ProjectionResult {
    project_with_options(source, target, blend, surface, &ProjectionOptions::default())
}

#[must_use]
pub fn project_with_options(
    source: Transform,
    target: Transform,
    blend: f64,
    surface: Option<&dyn RaySurface>,
    options: &ProjectionOptions,
) -> ProjectionResult {
    project_with_diagnostics(source, target, blend, surface, options).0
}

/// Run a projection and report how it was resolved.
///
/// Never fails: a missing surface, an empty surface and a zero-length path
/// all fall back to plain interpolation between the two translations.
#[must_use]
pub fn project_with_diagnostics(
    source: Transform,
    target: Transform,
    blend: f64,
    surface: Option<&dyn RaySurface>,
    options: &ProjectionOptions,
) -> (ProjectionResult, ProjectionDiagnostics) {
    let tol = options.tolerance();
    let source_pos = translation_of(&source);
    let target_pos = translation_of(&target);
    let mut delta = target_pos - source_pos;

    let mut diagnostics = ProjectionDiagnostics {
        surface_present: surface.is_some(),
        ..ProjectionDiagnostics::default()
    };

    let query = RayQuery::new(source_pos, delta)
        .with_both_directions(options.both_directions())
        .with_tolerance(tol);
    diagnostics.degenerate_direction = query.is_degenerate();

    let hit = match surface {
        Some(surface) if !diagnostics.degenerate_direction => {
            let hits = cast_ray(surface, &query, options.hit_order);
            diagnostics.hit_count = hits.len();
            hits.first().copied()
        }
        _ => None,
    };

    let oriented = options.mode == ProjectionMode::Oriented;
    let mut orientation = NO_HIT_ORIENTATION;
    let mut alignment = NO_HIT_ALIGNMENT;

    if let Some(hit) = hit {
        log::debug!(
            "projection: hit face {} at t={} ({} candidates)",
            hit.face_index,
            hit.ray_param,
            diagnostics.hit_count
        );
        delta = hit.point - source_pos;

        if oriented {
            let frame = surface
                .and_then(|surface| surface.face_normal(hit.face_index))
                .and_then(|normal| SurfaceFrame::from_normal(normal, &source, tol));
            match frame {
                Some(frame) => {
                    orientation = frame.orientation_degrees();
                    alignment = frame.normal.dot(source_pos - hit.point);
                    diagnostics.frame_reference = Some(frame.reference);
                }
                None => {
                    log::warn!(
                        "projection: face {} has no usable normal, keeping default orientation",
                        hit.face_index
                    );
                    diagnostics.normal_unavailable = true;
                }
            }
        }
    } else {
        log::debug!("projection: no hit, interpolating toward target");
    }

    // A zero-length path stays put for every blend, including non-finite ones.
    let position = if diagnostics.degenerate_direction && Tolerance::ZERO_LENGTH.is_zero_vec3(delta) {
        source_pos
    } else {
        source_pos + delta * blend
    };

    let result = ProjectionResult {
        position,
        orientation: oriented.then_some(orientation),
        alignment: oriented.then_some(alignment),
        delta,
        hit,
    };
    (result, diagnostics)
}

/// Evaluate many independent projections against one shared surface.
/// Results keep the order of `requests`.
#[cfg(feature = "parallel")]
#[must_use]
pub fn project_batch(
    requests: &[ProjectionRequest],
    surface: Option<&dyn RaySurface>,
    options: &ProjectionOptions,
) -> Vec<ProjectionResult> {
    requests
        .par_iter()
        .map(|r| project_with_options(r.source, r.target, r.blend, surface, options))
        .collect()
}

/// Evaluate many independent projections against one shared surface.
/// Results keep the order of `requests`.
#[cfg(not(feature = "parallel"))]
#[must_use]
pub fn project_batch(
    requests: &[ProjectionRequest],
    surface: Option<&dyn RaySurface>,
    options: &ProjectionOptions,
) -> Vec<ProjectionResult> {
    requests
        .iter()
        .map(|r| project_with_options(r.source, r.target, r.blend, surface, options))
        .collect()
}
