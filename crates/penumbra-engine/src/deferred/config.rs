use std::sync::Arc;

use crate::cmd::ShaderAsset;
use crate::light::{LightBlendStyle, MAX_BLEND_STYLES};
use crate::render::builtin;

use super::Deferred2DError;

/// Renderer-level configuration of the 2D pipeline.
#[derive(Debug, Clone)]
pub struct Renderer2DData {
    /// Full-screen shader modulating the base color by the global light.
    pub global_light_shader: Option<Arc<ShaderAsset>>,
    /// Shader drawing shaped light meshes. Pass 0 is volume, pass 1 lighting.
    pub shape_light_shader: Option<Arc<ShaderAsset>>,
    pub light_blend_styles: Vec<LightBlendStyle>,
    /// Headroom for light values above 1.0 in an 8-bit target.
    pub hdr_emulation_scale: f32,
}

impl Default for Renderer2DData {
    fn default() -> Self {
        Self {
            global_light_shader: Some(builtin::global_light_shader()),
            shape_light_shader: Some(builtin::shape_light_shader()),
            light_blend_styles: vec![
                LightBlendStyle::new("Default"),
                LightBlendStyle::new("Blend Style 1"),
                LightBlendStyle::new("Blend Style 2"),
                LightBlendStyle::new("Blend Style 3"),
            ],
            hdr_emulation_scale: 1.0,
        }
    }
}

impl Renderer2DData {
    /// Checks what can be checked without resolving materials.
    pub fn validate(&self) -> Result<(), Deferred2DError> {
        let count = self.light_blend_styles.len();
        if count > MAX_BLEND_STYLES {
            return Err(Deferred2DError::TooManyBlendStyles { count });
        }
        if !(self.hdr_emulation_scale.is_finite() && self.hdr_emulation_scale > 0.0) {
            log::warn!(
                "hdr emulation scale {} is not positive; light uniforms will not be finite",
                self.hdr_emulation_scale
            );
        }
        Ok(())
    }

    #[inline]
    pub fn inverse_hdr_emulation_scale(&self) -> f32 {
        1.0 / self.hdr_emulation_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let data = Renderer2DData::default();
        assert!(data.validate().is_ok());
        assert_eq!(data.light_blend_styles.len(), 4);
        assert_eq!(data.light_blend_styles[0].name, "Default");
        assert_eq!(data.inverse_hdr_emulation_scale(), 1.0);
    }

    #[test]
    fn thirty_two_styles_are_fine_thirty_three_are_not() {
        let mut data = Renderer2DData::default();
        data.light_blend_styles = (0..32).map(|i| LightBlendStyle::new(format!("S{i}"))).collect();
        assert!(data.validate().is_ok());

        data.light_blend_styles.push(LightBlendStyle::new("extra"));
        assert!(matches!(
            data.validate(),
            Err(Deferred2DError::TooManyBlendStyles { count: 33 })
        ));
    }

    #[test]
    fn inverse_scale() {
        let data = Renderer2DData { hdr_emulation_scale: 4.0, ..Default::default() };
        assert_eq!(data.inverse_hdr_emulation_scale(), 0.25);
    }

    #[test]
    fn zero_hdr_scale_passes_validation_with_infinite_inverse() {
        let data = Renderer2DData { hdr_emulation_scale: 0.0, ..Default::default() };
        assert!(data.validate().is_ok());
        assert!(data.inverse_hdr_emulation_scale().is_infinite());
    }
}
