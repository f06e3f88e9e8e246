//! Core types: math re-exports, Transform, Camera, orientation control.

pub use glam::{EulerRot, Mat4, Quat, Vec3, vec3};

pub mod bottom_bar;
pub mod camera;
pub mod orientation;
pub mod transform;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("unknown direction '{0}' (expected left, front or right)")]
    UnknownDirection(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        let t = transform::Transform::identity();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_scale_matrix() {
        let t = transform::Transform::from_trs(
            vec3(1.0, 2.0, 3.0),
            Quat::IDENTITY,
            vec3(2.0, 2.0, 2.0),
        );
        // Last column holds the translation, the diagonal the scale.
        let m = t.matrix().to_cols_array();
        assert!((m[12] - 1.0).abs() < 1e-6);
        assert!((m[13] - 2.0).abs() < 1e-6);
        assert!((m[14] - 3.0).abs() < 1e-6);
        assert!((m[0] - 2.0).abs() < 1e-6);
        assert!((m[5] - 2.0).abs() < 1e-6);
        assert!((m[10] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn framing_camera_pv_is_finite() {
        let cam = camera::Camera::framing(1.8, 16.0 / 9.0);
        let a = cam.proj_view().to_cols_array();
        assert!(a.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn unknown_direction_error_names_input() {
        let err = "up".parse::<bottom_bar::Direction>().unwrap_err();
        assert_eq!(err, CoreError::UnknownDirection("up".to_string()));
        assert!(err.to_string().contains("'up'"));
    }
}
