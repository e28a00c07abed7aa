use glam::Mat4;

use crate::cmd::{
    CommandBuffer, GlobalColor, GlobalFloat, GlobalTexture, GlobalVector, LoadAction, Material,
    MeshRef, RenderTargetRef, ShaderKeyword, StoreAction, TextureRef,
};
use crate::coords::ColorRgba;
use crate::light::{Light, LightBlendStyle, LightKind, LightRegistry, LightStats};
use crate::render::builtin::{GLOBAL_LIGHT_PASS, SHAPE_LIGHT_PASS};
use crate::scene::{Camera2D, SortingLayerId};

use super::{find_global_light, shaped_lights};

/// What one band's lighting composite recorded.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub(super) struct LightingSummary {
    pub global_light: bool,
    pub shaped_draws: u32,
}

/// Composites one band's lights onto the camera target.
pub(super) struct LightingStage<'a> {
    pub global_material: &'a Material,
    pub shape_material: &'a Material,
    pub blend_styles: &'a [LightBlendStyle],
    pub hdr_emulation_scale: f32,
}

impl LightingStage<'_> {
    pub fn record<R: LightRegistry>(
        &self,
        cmd: &mut CommandBuffer,
        registry: &R,
        layer: SortingLayerId,
        stats: &LightStats,
        camera: &Camera2D,
    ) -> LightingSummary {
        cmd.set_render_target(
            RenderTargetRef::CameraColor,
            LoadAction::Load,
            StoreAction::Store,
            None,
        );

        let global = find_global_light(registry, stats, layer, self.blend_styles.len());
        let color = global.map_or(ColorRgba::black(), Light::light_color);
        cmd.set_global_color(GlobalColor::LightColor, color);
        cmd.draw_mesh(MeshRef::Fullscreen, Mat4::IDENTITY, self.global_material, GLOBAL_LIGHT_PASS);

        let mut shaped_draws = 0;
        for style in stats.blend_styles_used.iter() {
            let Some(blend_style) = self.blend_styles.get(style) else {
                log::trace!("blend style {style} is used by lights but not configured");
                continue;
            };
            let sample = blend_style.sample_name();
            cmd.begin_sample(sample.clone());
            for (light, mesh) in shaped_lights(registry, style, layer, camera) {
                self.record_light_state(cmd, light);
                cmd.draw_mesh(
                    MeshRef::Light(mesh.clone()),
                    light.transform,
                    self.shape_material,
                    SHAPE_LIGHT_PASS,
                );
                shaped_draws += 1;
            }
            cmd.end_sample(sample);
        }

        LightingSummary { global_light: global.is_some(), shaped_draws }
    }

    /// Resets, then sets, every uniform and keyword the shape-light shader reads.
    fn record_light_state(&self, cmd: &mut CommandBuffer, light: &Light) {
        cmd.set_global_color(GlobalColor::LightColor, light.light_color());
        cmd.set_global_texture(GlobalTexture::FalloffLookup, TextureRef::FalloffLookup);
        cmd.set_global_float(GlobalFloat::FalloffIntensity, light.falloff_intensity);
        cmd.set_global_float(GlobalFloat::FalloffDistance, light.falloff_size);
        cmd.set_global_vector(GlobalVector::FalloffOffset, light.falloff_offset);
        cmd.set_global_float(GlobalFloat::VolumeOpacity, light.volume_opacity);
        cmd.set_global_float(GlobalFloat::HdrEmulationScale, self.hdr_emulation_scale);
        cmd.set_global_float(GlobalFloat::InverseHdrEmulationScale, 1.0 / self.hdr_emulation_scale);
        cmd.set_global_texture(GlobalTexture::Cookie, TextureRef::White);
        cmd.disable_keyword(ShaderKeyword::SpriteLight);
        cmd.enable_keyword(ShaderKeyword::UseAdditiveBlending);

        match &light.kind {
            LightKind::Sprite { .. } => {
                if let Some(cookie) = light.cookie() {
                    cmd.enable_keyword(ShaderKeyword::SpriteLight);
                    cmd.set_global_texture(GlobalTexture::Cookie, TextureRef::Image(cookie.clone()));
                } else {
                    log::trace!("sprite light without a usable cookie; drawing uncookied");
                }
            }
            LightKind::Global | LightKind::Parametric { .. } | LightKind::Freeform { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cmd::RenderCommand;
    use crate::coords::Vec2;
    use crate::light::{LightSet, Texture2D};
    use crate::render::builtin;

    const LAYER: SortingLayerId = SortingLayerId(0);

    struct Fixture {
        global: Material,
        shape: Material,
        styles: Vec<LightBlendStyle>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                global: Material::new(builtin::global_light_shader()),
                shape: Material::new(builtin::shape_light_shader()),
                styles: vec![LightBlendStyle::new("A"), LightBlendStyle::new("B")],
            }
        }

        fn stage(&self) -> LightingStage<'_> {
            LightingStage {
                global_material: &self.global,
                shape_material: &self.shape,
                blend_styles: &self.styles,
                hdr_emulation_scale: 2.0,
            }
        }

        fn record(&self, set: &LightSet) -> (CommandBuffer, LightingSummary) {
            let mut cmd = CommandBuffer::new("test");
            let stats = set.light_stats_by_layer(LAYER);
            let camera = Camera2D::new(Vec2::zero(), Vec2::new(10.0, 10.0));
            let summary = self.stage().record(&mut cmd, set, LAYER, &stats, &camera);
            (cmd, summary)
        }
    }

    fn light_colors(cmd: &CommandBuffer) -> Vec<ColorRgba> {
        cmd.commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::SetGlobalColor(GlobalColor::LightColor, v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn no_lights_draws_black_global_only() {
        let fx = Fixture::new();
        let (cmd, summary) = fx.record(&LightSet::new());

        assert_eq!(summary, LightingSummary { global_light: false, shaped_draws: 0 });
        assert_eq!(light_colors(&cmd), vec![ColorRgba::black()]);
        assert_eq!(cmd.len(), 3);
        assert!(matches!(
            &cmd.commands()[2],
            RenderCommand::DrawMesh { mesh: MeshRef::Fullscreen, pass: GLOBAL_LIGHT_PASS, .. }
        ));
    }

    #[test]
    fn global_light_color_is_scaled_by_intensity() {
        let fx = Fixture::new();
        let mut set = LightSet::new();
        set.add(Light::global(ColorRgba::new(1.0, 0.5, 0.25, 1.0), 2.0).with_layers([LAYER]));

        let (cmd, summary) = fx.record(&set);
        assert!(summary.global_light);
        assert_eq!(light_colors(&cmd), vec![ColorRgba::new(2.0, 1.0, 0.5, 2.0)]);
    }

    #[test]
    fn shaped_light_resets_state_before_draw() {
        let fx = Fixture::new();
        let mut set = LightSet::new();
        set.add(Light::parametric(8, 1.0).with_layers([LAYER]).with_blend_style(1));

        let (cmd, summary) = fx.record(&set);
        assert_eq!(summary.shaped_draws, 1);

        let cmds = cmd.commands();
        let begin = cmds
            .iter()
            .position(|c| *c == RenderCommand::BeginSample("Blend Style - B".into()))
            .unwrap();
        assert!(cmds.contains(&RenderCommand::SetGlobalFloat(GlobalFloat::InverseHdrEmulationScale, 0.5)));
        assert!(cmds.contains(&RenderCommand::SetGlobalTexture(GlobalTexture::Cookie, TextureRef::White)));
        assert!(cmds.contains(&RenderCommand::DisableKeyword(ShaderKeyword::SpriteLight)));
        assert!(!cmds.contains(&RenderCommand::EnableKeyword(ShaderKeyword::SpriteLight)));
        match &cmds[cmds.len() - 2] {
            RenderCommand::DrawMesh { mesh: MeshRef::Light(_), pass, material, .. } => {
                assert_eq!(*pass, SHAPE_LIGHT_PASS);
                assert_eq!(material, &fx.shape);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cmds.last(), Some(&RenderCommand::EndSample("Blend Style - B".into())));
        assert!(begin < cmds.len() - 2);
    }

    #[test]
    fn sprite_cookie_enables_keyword_and_binds_texture() {
        let fx = Fixture::new();
        let cookie = Texture2D::solid([255, 128, 0, 255]);
        let mut set = LightSet::new();
        set.add(Light::sprite(Vec2::new(2.0, 2.0), Some(cookie.clone())).with_layers([LAYER]));

        let (cmd, _) = fx.record(&set);
        let cmds = cmd.commands();
        assert!(cmds.contains(&RenderCommand::EnableKeyword(ShaderKeyword::SpriteLight)));
        assert!(cmds.contains(&RenderCommand::SetGlobalTexture(
            GlobalTexture::Cookie,
            TextureRef::Image(cookie)
        )));
    }

    #[test]
    fn invalid_cookie_falls_back() {
        let fx = Fixture::new();
        let broken = Texture2D::from_rgba8(4, 4, Arc::<[u8]>::from(vec![0u8; 3]));
        let mut set = LightSet::new();
        set.add(Light::sprite(Vec2::new(2.0, 2.0), Some(broken)).with_layers([LAYER]));

        let (cmd, summary) = fx.record(&set);
        assert_eq!(summary.shaped_draws, 1);
        assert!(!cmd.commands().contains(&RenderCommand::EnableKeyword(ShaderKeyword::SpriteLight)));
    }

    #[test]
    fn unconfigured_style_is_skipped() {
        let fx = Fixture::new();
        let mut set = LightSet::new();
        set.add(Light::parametric(4, 1.0).with_layers([LAYER]).with_blend_style(5));

        let (cmd, summary) = fx.record(&set);
        assert_eq!(summary.shaped_draws, 0);
        assert!(!cmd.commands().iter().any(|c| matches!(c, RenderCommand::BeginSample(_))));
    }
}
