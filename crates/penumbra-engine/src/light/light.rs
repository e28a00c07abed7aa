use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::coords::{ColorRgba, Rect, Vec2};
use crate::scene::{Camera2D, SortingLayerId};

use super::{LightMesh, Texture2D};

/// Light variants and the data only that variant carries.
#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    /// Uniform contribution over a whole band; no mesh, always visible.
    Global,
    /// Regular-polygon light generated from a few parameters.
    Parametric { mesh: Option<Arc<LightMesh>> },
    /// Light with an arbitrary outline.
    Freeform { mesh: Option<Arc<LightMesh>> },
    /// Light shaped by a quad, optionally masked by a cookie image.
    Sprite { mesh: Option<Arc<LightMesh>>, cookie: Option<Texture2D> },
}

/// A 2D light source.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: ColorRgba,
    pub intensity: f32,
    /// Row selector of the falloff lookup: curve steepness.
    pub falloff_intensity: f32,
    /// Width of the falloff ring in local units.
    pub falloff_size: f32,
    pub falloff_offset: Vec2,
    pub volume_opacity: f32,
    /// Index into the renderer's blend-style table.
    pub blend_style: usize,
    /// Sorting layers this light illuminates.
    pub target_layers: Vec<SortingLayerId>,
    /// Local to world.
    pub transform: Mat4,
}

impl Light {
    fn with_kind(kind: LightKind) -> Self {
        Self {
            kind,
            color: ColorRgba::white(),
            intensity: 1.0,
            falloff_intensity: 0.5,
            falloff_size: 0.5,
            falloff_offset: Vec2::zero(),
            volume_opacity: 0.0,
            blend_style: 0,
            target_layers: Vec::new(),
            transform: Mat4::IDENTITY,
        }
    }

    pub fn global(color: ColorRgba, intensity: f32) -> Self {
        Self { color, intensity, ..Self::with_kind(LightKind::Global) }
    }

    pub fn parametric(sides: u32, radius: f32) -> Self {
        let mesh = Some(Arc::new(LightMesh::parametric(sides, radius)));
        Self::with_kind(LightKind::Parametric { mesh })
    }

    pub fn freeform(outline: &[Vec2]) -> Self {
        let mesh = Some(Arc::new(LightMesh::freeform(outline)));
        Self::with_kind(LightKind::Freeform { mesh })
    }

    pub fn sprite(size: Vec2, cookie: Option<Texture2D>) -> Self {
        let mesh = Some(Arc::new(LightMesh::sprite_quad(size)));
        Self::with_kind(LightKind::Sprite { mesh, cookie })
    }

    pub fn with_color(mut self, color: ColorRgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_falloff(mut self, size: f32, intensity: f32) -> Self {
        self.falloff_size = size;
        self.falloff_intensity = intensity;
        self
    }

    pub fn with_falloff_offset(mut self, offset: Vec2) -> Self {
        self.falloff_offset = offset;
        self
    }

    pub fn with_volume_opacity(mut self, opacity: f32) -> Self {
        self.volume_opacity = opacity;
        self
    }

    pub fn with_blend_style(mut self, style: usize) -> Self {
        self.blend_style = style;
        self
    }

    pub fn with_layers(mut self, layers: impl IntoIterator<Item = SortingLayerId>) -> Self {
        self.target_layers = layers.into_iter().collect();
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Places the light at `position` (keeps no rotation or scale).
    pub fn at(self, position: Vec2) -> Self {
        self.with_transform(Mat4::from_translation(Vec3::new(position.x, position.y, 0.0)))
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        matches!(self.kind, LightKind::Global)
    }

    #[inline]
    pub fn is_lit_layer(&self, layer: SortingLayerId) -> bool {
        self.target_layers.contains(&layer)
    }

    #[inline]
    pub fn is_volumetric(&self) -> bool {
        self.volume_opacity > 0.0
    }

    /// `intensity * color`, the value uploaded as the light color.
    #[inline]
    pub fn light_color(&self) -> ColorRgba {
        self.intensity * self.color
    }

    /// Renderable mesh, if this variant has one and it is available.
    pub fn mesh(&self) -> Option<&Arc<LightMesh>> {
        match &self.kind {
            LightKind::Global => None,
            LightKind::Parametric { mesh }
            | LightKind::Freeform { mesh }
            | LightKind::Sprite { mesh, .. } => mesh.as_ref(),
        }
    }

    /// Replaces the mesh of a shaped light. No-op for global lights.
    pub fn set_mesh(&mut self, new_mesh: Option<Arc<LightMesh>>) {
        match &mut self.kind {
            LightKind::Global => {}
            LightKind::Parametric { mesh }
            | LightKind::Freeform { mesh }
            | LightKind::Sprite { mesh, .. } => *mesh = new_mesh,
        }
    }

    /// Cookie image of a sprite light, only when it is usable.
    pub fn cookie(&self) -> Option<&Texture2D> {
        match &self.kind {
            LightKind::Sprite { cookie: Some(tex), .. } if tex.is_valid() => Some(tex),
            _ => None,
        }
    }

    /// World-space bounds of the lit area, falloff included.
    ///
    /// `None` for global lights and for shaped lights without a mesh.
    pub fn world_bounds(&self) -> Option<Rect> {
        let local = self.mesh()?.local_bounds(self.falloff_size, self.falloff_offset)?;
        let (min, max) = (local.min(), local.max());
        let corners = [
            Vec2::new(min.x, min.y),
            Vec2::new(max.x, min.y),
            Vec2::new(max.x, max.y),
            Vec2::new(min.x, max.y),
        ];
        Rect::from_points(corners.into_iter().map(|c| {
            let p = self.transform.transform_point3(Vec3::new(c.x, c.y, 0.0));
            Vec2::new(p.x, p.y)
        }))
    }

    /// Whether the light can touch anything `camera` sees.
    pub fn is_visible(&self, camera: &Camera2D) -> bool {
        if self.is_global() {
            return true;
        }
        self.world_bounds()
            .is_some_and(|b| b.overlaps(camera.view_rect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera2D {
        Camera2D::new(Vec2::zero(), Vec2::new(10.0, 10.0))
    }

    #[test]
    fn light_color_scales_by_intensity() {
        let l = Light::global(ColorRgba::new(1.0, 0.5, 0.0, 1.0), 2.0);
        assert_eq!(l.light_color(), ColorRgba::new(2.0, 1.0, 0.0, 2.0));
    }

    #[test]
    fn global_has_no_mesh_and_is_always_visible() {
        let l = Light::global(ColorRgba::white(), 1.0);
        assert!(l.mesh().is_none());
        assert!(l.world_bounds().is_none());
        assert!(l.is_visible(&Camera2D::new(Vec2::new(1e6, 1e6), Vec2::new(1.0, 1.0))));
    }

    #[test]
    fn visibility_follows_world_bounds() {
        let near = Light::parametric(8, 1.0).at(Vec2::new(4.0, 0.0));
        let far = Light::parametric(8, 1.0).at(Vec2::new(40.0, 0.0));
        assert!(near.is_visible(&camera()));
        assert!(!far.is_visible(&camera()));
    }

    #[test]
    fn falloff_extends_visibility() {
        // Core ends at x = -6.5; the falloff ring reaches past the view edge at x = -5.
        let l = Light::parametric(4, 1.0).with_falloff(2.0, 0.5).at(Vec2::new(-7.5, 0.0));
        assert!(l.is_visible(&camera()));
        assert!(!l.clone().with_falloff(0.0, 0.5).is_visible(&camera()));
    }

    #[test]
    fn missing_mesh_is_invisible() {
        let mut l = Light::freeform(&[Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)]);
        l.set_mesh(None);
        assert!(l.mesh().is_none());
        assert!(!l.is_visible(&camera()));
    }

    #[test]
    fn cookie_requires_valid_image() {
        let with = Light::sprite(Vec2::new(1.0, 1.0), Some(Texture2D::solid([255; 4])));
        let broken = Light::sprite(Vec2::new(1.0, 1.0), Some(Texture2D::from_rgba8(4, 4, vec![0; 3])));
        let without = Light::sprite(Vec2::new(1.0, 1.0), None);
        assert!(with.cookie().is_some());
        assert!(broken.cookie().is_none());
        assert!(without.cookie().is_none());
    }

    #[test]
    fn lit_layers() {
        let l = Light::global(ColorRgba::white(), 1.0).with_layers([SortingLayerId(2)]);
        assert!(l.is_lit_layer(SortingLayerId(2)));
        assert!(!l.is_lit_layer(SortingLayerId(3)));
    }
}
