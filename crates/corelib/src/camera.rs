use crate::{Mat4, Vec3};

/// Simple perspective camera (right-handed).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Camera {
    /// Camera on +Z looking at the origin, far enough back that a sphere of
    /// `radius` fills most of the vertical field of view.
    pub fn framing(radius: f32, aspect: f32) -> Self {
        let fov_y_rad = 45f32.to_radians();
        let radius = radius.max(1e-3);
        let distance = radius / (0.5 * fov_y_rad).sin() * 1.1;
        Self {
            eye: Vec3::new(0.0, radius * 0.35, distance),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_rad,
            z_near: (distance - radius * 2.0).max(0.05),
            z_far: distance + radius * 4.0,
            aspect,
        }
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// wgpu-style projection (z in [0, 1]).
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }

    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_keeps_origin_in_front_of_near_plane() {
        let cam = Camera::framing(1.0, 1.0);
        let distance = cam.eye.length();
        assert!(cam.z_near < distance - 1.0);
        assert!(cam.z_far > distance + 1.0);
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = Camera::framing(2.0, 4.0 / 3.0);
        let clip = cam.proj_view() * Vec3::ZERO.extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
