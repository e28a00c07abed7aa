use glam::Mat4;

use crate::coords::{Rect, Vec2};

/// Orthographic 2D camera.
///
/// `view_size` is the visible extent in world units. The aspect ratio of the
/// render target is expected to match it; the backend does not letterbox.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera2D {
    pub center: Vec2,
    pub view_size: Vec2,
}

impl Camera2D {
    #[inline]
    pub const fn new(center: Vec2, view_size: Vec2) -> Self {
        Self { center, view_size }
    }

    /// Camera showing `pixels_per_unit` pixels per world unit on a target of
    /// `width` x `height` pixels.
    pub fn for_target(center: Vec2, width: u32, height: u32, pixels_per_unit: f32) -> Self {
        let ppu = pixels_per_unit.max(f32::EPSILON);
        Self::new(center, Vec2::new(width.max(1) as f32 / ppu, height.max(1) as f32 / ppu))
    }

    /// World-space rectangle covered by the camera.
    #[inline]
    pub fn view_rect(&self) -> Rect {
        Rect::from_center_size(self.center, self.view_size)
    }

    /// World to clip space (right-handed, +Y up).
    pub fn view_projection(&self) -> Mat4 {
        let r = self.view_rect();
        let (min, max) = (r.min(), r.max());
        Mat4::orthographic_rh(min.x, max.x, min.y, max.y, -1.0, 1.0)
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(Vec2::zero(), Vec2::new(16.0, 9.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn view_rect_is_centered() {
        let cam = Camera2D::new(Vec2::new(2.0, 1.0), Vec2::new(4.0, 2.0));
        assert_eq!(cam.view_rect(), Rect::new(0.0, 0.0, 4.0, 2.0));
    }

    #[test]
    fn for_target_uses_pixels_per_unit() {
        let cam = Camera2D::for_target(Vec2::zero(), 1280, 720, 80.0);
        assert_eq!(cam.view_size, Vec2::new(16.0, 9.0));
    }

    #[test]
    fn view_projection_maps_corners_to_clip_edges() {
        let cam = Camera2D::new(Vec2::zero(), Vec2::new(4.0, 2.0));
        let vp = cam.view_projection();

        let top_right = vp * Vec4::new(2.0, 1.0, 0.0, 1.0);
        assert!((top_right.x - 1.0).abs() < 1e-6);
        assert!((top_right.y - 1.0).abs() < 1e-6);

        let bottom_left = vp * Vec4::new(-2.0, -1.0, 0.0, 1.0);
        assert!((bottom_left.x + 1.0).abs() < 1e-6);
        assert!((bottom_left.y + 1.0).abs() < 1e-6);
    }
}
