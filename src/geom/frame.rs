//! Orthonormal frame on a hit surface.
//!
//! The frame keeps the surface normal as its Y axis and takes its heading
//! from the source transform, so an object snapped to the surface keeps
//! facing roughly the way it faced before.

use serde::{Deserialize, Serialize};

use super::{Point3, Tolerance, Transform, Vec3};

/// Reference axis a [`SurfaceFrame`] was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameReference {
    /// Source Z axis, the regular case.
    SourceZ,
    /// Source X axis, used when the normal is parallel to the source Z axis.
    SourceX,
    WorldZ,
    WorldX,
}

impl FrameReference {
    #[must_use]
    pub const fn is_fallback(self) -> bool {
        !matches!(self, Self::SourceZ)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFrame {
    pub x_axis: Vec3,
    /// Unit surface normal, the frame's Y axis.
    pub normal: Vec3,
    pub z_axis: Vec3,
    pub reference: FrameReference,
}

impl SurfaceFrame {
    /// Build a right-handed frame with `normal` as Y axis.
    ///
    /// With the source Z axis `sz`: `x = n × sz`, `z = -(n × x)`, `x = n × z`.
    /// When `n` and `sz` are parallel the source X axis `sx` is used instead
    /// (`z = sx × n`, `x = n × z`), then world Z and world X. Returns `None`
    /// only when `normal` has no direction.
    #[must_use]
    pub fn from_normal(normal: Vec3, source: &Transform, tol: Tolerance) -> Option<Self> {
        if !normal.is_finite() {
            return None;
        }
        let n = normal.normalized()?;
        let min_sine = tol.eps.sqrt();

        let candidates = [
            (FrameReference::SourceZ, source.z_axis()),
            (FrameReference::SourceX, source.x_axis()),
            (FrameReference::WorldZ, Vec3::Z),
            (FrameReference::WorldX, Vec3::X),
        ];

        for (reference, axis) in candidates {
            let Some(axis) = axis.normalized() else {
                continue;
            };
            let frame = match reference {
                FrameReference::SourceZ | FrameReference::WorldZ => from_z_reference(n, axis, min_sine),
                FrameReference::SourceX | FrameReference::WorldX => from_x_reference(n, axis, min_sine),
            };
            if let Some((x_axis, z_axis)) = frame {
                if reference.is_fallback() {
                    log::debug!("surface frame: normal {n:?} parallel to source Z, using {reference:?}");
                }
                return Some(Self {
                    x_axis,
                    normal: n,
                    z_axis,
                    reference,
                });
            }
        }

        None
    }

    #[must_use]
    pub fn to_transform(&self, origin: Point3) -> Transform {
        Transform::from_axes(origin, self.x_axis, self.normal, self.z_axis)
    }

    /// XYZ Euler angles of the frame in degrees.
    #[must_use]
    pub fn orientation_degrees(&self) -> Vec3 {
        self.to_transform(Point3::ORIGIN).euler_xyz_degrees()
    }
}

fn from_z_reference(n: Vec3, reference_z: Vec3, min_sine: f64) -> Option<(Vec3, Vec3)> {
    let x = n.cross(reference_z);
    if x.length() <= min_sine {
        return None;
    }
    let z = -n.cross(x);
    let x = n.cross(z);
    Some((x.normalized()?, z.normalized()?))
}

fn from_x_reference(n: Vec3, reference_x: Vec3, min_sine: f64) -> Option<(Vec3, Vec3)> {
    let z = reference_x.cross(n);
    if z.length() <= min_sine {
        return None;
    }
    let x = n.cross(z);
    Some((x.normalized()?, z.normalized()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn tilted_normal_uses_source_z() {
        let n = Vec3::new(0.0, 1.0, 1.0);
        let frame = SurfaceFrame::from_normal(n, &Transform::identity(), Tolerance::DEFAULT).unwrap();
        assert_eq!(frame.reference, FrameReference::SourceZ);
        assert_vec_close(frame.normal, n.normalized().unwrap());
        assert!(frame.x_axis.dot(frame.normal).abs() < 1e-12);
        assert!(frame.z_axis.dot(frame.normal).abs() < 1e-12);
        assert_vec_close(frame.x_axis.cross(frame.normal), frame.z_axis);
    }

    #[test]
    fn normal_along_source_z_falls_back_to_source_x() {
        let frame =
            SurfaceFrame::from_normal(-Vec3::Z, &Transform::identity(), Tolerance::DEFAULT).unwrap();
        assert_eq!(frame.reference, FrameReference::SourceX);
        assert_vec_close(frame.x_axis, Vec3::X);
        assert_vec_close(frame.z_axis, Vec3::Y);
        assert_vec_close(frame.orientation_degrees(), Vec3::new(-90.0, 0.0, 0.0));
    }

    #[test]
    fn collapsed_source_uses_world_axes() {
        let flat = Transform::scale(0.0, 0.0, 0.0);
        let frame = SurfaceFrame::from_normal(Vec3::Y, &flat, Tolerance::DEFAULT).unwrap();
        assert_eq!(frame.reference, FrameReference::WorldZ);
        assert_vec_close(frame.orientation_degrees(), Vec3::ZERO);

        let frame = SurfaceFrame::from_normal(Vec3::Z, &flat, Tolerance::DEFAULT).unwrap();
        assert_eq!(frame.reference, FrameReference::WorldX);
    }

    #[test]
    fn zero_normal_has_no_frame() {
        assert!(SurfaceFrame::from_normal(Vec3::ZERO, &Transform::identity(), Tolerance::DEFAULT).is_none());
        let nan = Vec3::new(f64::NAN, 0.0, 1.0);
        assert!(SurfaceFrame::from_normal(nan, &Transform::identity(), Tolerance::DEFAULT).is_none());
    }
}
