use crate::{EulerRot, Mat4, Quat, Vec3};

/// `|dot|` above this means two rotations are considered equal.
const DOT_EPSILON: f32 = 1e-6;

/// Rigid transform with non-uniform scale and quaternion rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    #[inline]
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[inline]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::identity()
        }
    }

    /// Build matrix = T * R * S (column-major Mat4 per glam).
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotation from Euler angles in degrees.
///
/// Roll (Z) is applied first, then pitch (X), then yaw (Y).
#[inline]
pub fn euler_deg(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        y.to_radians(),
        x.to_radians(),
        z.to_radians(),
    )
}

/// Angle between two rotations in degrees, in `[0, 180]`.
pub fn angle_between_deg(a: Quat, b: Quat) -> f32 {
    let dot = a.dot(b).abs().min(1.0);
    if dot > 1.0 - DOT_EPSILON {
        0.0
    } else {
        (2.0 * dot.acos()).to_degrees()
    }
}

/// Rotate `from` toward `to` by at most `max_deg` degrees along the shortest arc.
///
/// Returns `to` itself once it is within reach, so repeated stepping lands on
/// the target exactly.
pub fn rotate_towards(from: Quat, to: Quat, max_deg: f32) -> Quat {
    if max_deg <= 0.0 {
        return from;
    }
    let angle = angle_between_deg(from, to);
    if angle <= max_deg {
        return to;
    }
    from.slerp(to, max_deg / angle)
}

/// Pose with pitch pinned to 90 degrees and the given yaw about local Z.
#[inline]
pub fn pinned_pose(yaw_deg: f32) -> Quat {
    euler_deg(90.0, 0.0, yaw_deg)
}

/// Yaw of `q` relative to the pinned 90-degree pitch, in `(-180, 180]`.
///
/// Removes the pitch and keeps the twist about local Z. Reading the Z Euler
/// angle directly is degenerate at this pitch (gimbal lock).
pub fn pinned_yaw_deg(q: Quat) -> f32 {
    let residual = pinned_pose(0.0).inverse() * q;
    let (z, w) = (residual.z, residual.w);
    if z.abs() < f32::EPSILON && w.abs() < f32::EPSILON {
        return 0.0;
    }
    let yaw = (2.0 * z.atan2(w)).to_degrees();
    normalize_deg(yaw)
}

fn normalize_deg(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn euler_applies_roll_then_pitch() {
        // Local +Y faces +Z after a 90 degree pitch.
        let v = pinned_pose(0.0) * Vec3::Y;
        assert!(v.abs_diff_eq(Vec3::Z, 1e-5), "{v:?}");
        // Local +Z becomes the vertical axis, so roll acts as yaw.
        let up = pinned_pose(0.0) * Vec3::Z;
        assert!(up.abs_diff_eq(-Vec3::Y, 1e-5), "{up:?}");
    }

    #[test]
    fn angle_between_ignores_double_cover() {
        let q = euler_deg(10.0, 20.0, 30.0);
        assert_eq!(angle_between_deg(q, -q), 0.0);
        let r = Quat::from_rotation_y(90f32.to_radians());
        assert!(approx(angle_between_deg(Quat::IDENTITY, r), 90.0, 1e-3));
    }

    #[test]
    fn rotate_towards_steps_at_most_max() {
        let to = Quat::from_rotation_y(90f32.to_radians());
        let step = rotate_towards(Quat::IDENTITY, to, 30.0);
        assert!(approx(angle_between_deg(Quat::IDENTITY, step), 30.0, 1e-2));
        assert!(approx(angle_between_deg(step, to), 60.0, 1e-2));
    }

    #[test]
    fn rotate_towards_lands_exactly_within_reach() {
        let to = Quat::from_rotation_y(10f32.to_radians());
        assert_eq!(rotate_towards(Quat::IDENTITY, to, 45.0), to);
    }

    #[test]
    fn rotate_towards_with_zero_step_stays_put() {
        let to = Quat::from_rotation_y(1.0);
        assert_eq!(rotate_towards(Quat::IDENTITY, to, 0.0), Quat::IDENTITY);
    }

    #[test]
    fn pinned_yaw_round_trips() {
        for yaw in [-170.0, -90.0, -45.0, 0.0, 30.0, 90.0, 179.0] {
            let got = pinned_yaw_deg(pinned_pose(yaw));
            assert!(approx(got, yaw, 1e-2), "yaw {yaw} read back as {got}");
        }
    }

    #[test]
    fn pinned_yaw_of_identity_is_zero() {
        assert!(approx(pinned_yaw_deg(Quat::IDENTITY), 0.0, 1e-4));
    }

    #[test]
    fn normalize_wraps_into_half_open_range() {
        assert_eq!(normalize_deg(-180.0), 180.0);
        assert_eq!(normalize_deg(270.0), -90.0);
        assert_eq!(normalize_deg(360.0), 0.0);
    }
}
