//! Whole-frame recordings of the shading pass.

use crate::cmd::{
    BackendError, CommandBuffer, CommandRecorder, GlobalColor, GlobalFloat, GlobalTexture, MeshRef,
    RenderCommand, RenderContext, ShaderKeyword, TextureRef,
};
use crate::coords::{ColorRgba, Vec2};
use crate::light::{Light, LightBlendStyle, LightSet, Texture2D};
use crate::scene::{Camera2D, SortingLayerId, SortingLayerTable};

use super::{Deferred2DError, Deferred2DShadingPass, Renderer2DData, RenderingData, ShadingStats};

fn rendering() -> RenderingData {
    RenderingData {
        camera: Camera2D::new(Vec2::zero(), Vec2::new(16.0, 9.0)),
        target_width: 320,
        target_height: 180,
    }
}

fn table(values: &[i16]) -> (SortingLayerTable, Vec<SortingLayerId>) {
    let mut t = SortingLayerTable::new();
    let ids = values.iter().enumerate().map(|(i, &v)| t.push(format!("L{i}"), v)).collect();
    (t, ids)
}

fn sample_names<'a>(rec: &'a CommandRecorder, prefix: &str) -> Vec<&'a str> {
    rec.commands()
        .filter_map(|c| match c {
            RenderCommand::BeginSample(name) if name.starts_with(prefix) => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

/// Light color set right before the full-screen draw of each band.
fn global_colors(rec: &CommandRecorder) -> Vec<ColorRgba> {
    let mut out = Vec::new();
    let mut last = None;
    for cmd in rec.commands() {
        match cmd {
            RenderCommand::SetGlobalColor(GlobalColor::LightColor, c) => last = Some(*c),
            RenderCommand::DrawMesh { mesh: MeshRef::Fullscreen, .. } => {
                out.extend(last);
            }
            _ => {}
        }
    }
    out
}

#[test]
fn three_layers_render_in_order_with_their_lights() {
    let (layers, ids) = table(&[-100, 0, 100]);
    let mut lights = LightSet::new();
    lights.add(Light::global(ColorRgba::new(0.2, 0.2, 0.3, 1.0), 1.0).with_layers([ids[0]]));
    lights.add(Light::parametric(16, 1.0).with_layers([ids[1], ids[2]]));
    lights.add(
        Light::sprite(Vec2::new(2.0, 2.0), Some(Texture2D::solid([255, 0, 0, 255])))
            .with_blend_style(2)
            .with_layers([ids[2]]),
    );

    let mut pass = Deferred2DShadingPass::new(Renderer2DData::default(), layers).unwrap();
    let mut rec = CommandRecorder::new();
    pass.execute(&mut rec, &rendering(), &lights).unwrap();

    assert_eq!(
        sample_names(&rec, "Sorting Layer"),
        ["Sorting Layer - L0", "Sorting Layer - L1", "Sorting Layer - L2"]
    );
    assert_eq!(
        sample_names(&rec, "Blend Style"),
        ["Blend Style - Default", "Blend Style - Default", "Blend Style - Blend Style 2"]
    );
    assert_eq!(
        pass.last_stats(),
        ShadingStats { bands: 3, global_lights: 1, shaped_draws: 3 }
    );
    assert_eq!(rec.batches().len(), 4);
    assert_eq!(rec.live_targets(), 0);
    assert!(rec.open_samples().is_empty());
}

#[test]
fn first_global_light_wins_and_unlit_bands_go_black() {
    let (layers, ids) = table(&[0, 1]);
    let red = ColorRgba::new(1.0, 0.0, 0.0, 1.0);
    let mut lights = LightSet::new();
    lights.add(Light::global(red, 1.0).with_layers([ids[0]]));
    lights.add(Light::global(ColorRgba::new(0.0, 1.0, 0.0, 1.0), 1.0).with_layers([ids[0]]));

    let mut pass = Deferred2DShadingPass::new(Renderer2DData::default(), layers).unwrap();
    let mut rec = CommandRecorder::new();
    pass.execute(&mut rec, &rendering(), &lights).unwrap();

    assert_eq!(global_colors(&rec), [red, ColorRgba::black()]);
    assert_eq!(pass.last_stats().global_lights, 1);
}

#[test]
fn lights_without_target_layers_draw_nothing() {
    let (layers, _) = table(&[0]);
    let mut lights = LightSet::new();
    lights.add(Light::parametric(8, 1.0));
    lights.add(Light::global(ColorRgba::white(), 1.0));

    let mut pass = Deferred2DShadingPass::new(Renderer2DData::default(), layers).unwrap();
    let mut rec = CommandRecorder::new();
    pass.execute(&mut rec, &rendering(), &lights).unwrap();

    assert_eq!(pass.last_stats(), ShadingStats { bands: 1, global_lights: 0, shaped_draws: 0 });
    assert!(sample_names(&rec, "Blend Style").is_empty());
}

#[test]
fn cookie_keyword_follows_each_light() {
    let (layers, ids) = table(&[0]);
    let cookie = Texture2D::solid([255, 255, 255, 128]);
    let mut lights = LightSet::new();
    lights.add(Light::sprite(Vec2::new(1.0, 1.0), Some(cookie.clone())).with_layers([ids[0]]));
    lights.add(Light::sprite(Vec2::new(1.0, 1.0), None).with_layers([ids[0]]));

    let mut pass = Deferred2DShadingPass::new(Renderer2DData::default(), layers).unwrap();
    let mut rec = CommandRecorder::new();
    pass.execute(&mut rec, &rendering(), &lights).unwrap();

    // Keyword state as seen by each shaped draw.
    let mut sprite = false;
    let mut cookies = Vec::new();
    let mut seen = Vec::new();
    for cmd in rec.commands() {
        match cmd {
            RenderCommand::EnableKeyword(ShaderKeyword::SpriteLight) => sprite = true,
            RenderCommand::DisableKeyword(ShaderKeyword::SpriteLight) => sprite = false,
            RenderCommand::SetGlobalTexture(GlobalTexture::Cookie, tex) => cookies.push(tex.clone()),
            RenderCommand::DrawMesh { mesh: MeshRef::Light(_), .. } => seen.push(sprite),
            _ => {}
        }
    }
    assert_eq!(seen, [true, false]);
    assert_eq!(
        cookies,
        [TextureRef::White, TextureRef::Image(cookie), TextureRef::White]
    );
}

#[test]
fn repeated_frames_record_the_same_stream() {
    let (layers, ids) = table(&[-1, 0, 1]);
    let mut lights = LightSet::new();
    lights.add(Light::global(ColorRgba::white(), 0.5).with_layers(ids.clone()));
    lights.add(Light::freeform(&[
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 1.0),
    ])
    .with_layers(ids));

    let mut pass = Deferred2DShadingPass::new(Renderer2DData::default(), layers).unwrap();
    let mut first = CommandRecorder::new();
    let mut second = CommandRecorder::new();
    pass.execute(&mut first, &rendering(), &lights).unwrap();
    pass.execute(&mut second, &rendering(), &lights).unwrap();

    assert_eq!(first.batches(), second.batches());
}

#[test]
fn edited_layers_are_picked_up_only_while_not_playing() {
    let (layers, _) = table(&[0]);
    let mut pass = Deferred2DShadingPass::new(Renderer2DData::default(), layers).unwrap();
    let mut rec = CommandRecorder::new();

    pass.source_mut().push("Late", 50);
    pass.execute(&mut rec, &rendering(), &LightSet::new()).unwrap();
    assert_eq!(pass.last_stats().bands, 1);

    pass.source_mut().set_playing(false);
    pass.execute(&mut rec, &rendering(), &LightSet::new()).unwrap();
    assert_eq!(pass.last_stats().bands, 2);
    assert_eq!(pass.sorting_layers().len(), 2);
}

#[test]
fn too_many_blend_styles_is_rejected() {
    let data = Renderer2DData {
        light_blend_styles: (0..33).map(|i| LightBlendStyle::new(format!("S{i}"))).collect(),
        ..Default::default()
    };
    let (layers, _) = table(&[0]);
    let err = Deferred2DShadingPass::new(data, layers).err().unwrap();
    assert!(matches!(err, Deferred2DError::TooManyBlendStyles { count: 33 }));
}

#[test]
fn missing_global_shader_fails_before_recording() {
    let data = Renderer2DData { global_light_shader: None, ..Default::default() };
    let (layers, _) = table(&[0]);
    let mut pass = Deferred2DShadingPass::new(data, layers).unwrap();
    let mut rec = CommandRecorder::new();

    let err = pass.execute(&mut rec, &rendering(), &LightSet::new()).unwrap_err();
    assert!(matches!(err, Deferred2DError::MissingShader("global light")));
    assert!(rec.batches().is_empty());
    assert!(pass.base_color_target().is_none());
}

/// Records like `CommandRecorder`, then reports failure for batch `fail_at`.
struct FailingBatch {
    inner: CommandRecorder,
    fail_at: Option<usize>,
    executed: usize,
}

impl RenderContext for FailingBatch {
    fn execute_command_buffer(&mut self, cmd: &CommandBuffer) -> Result<(), BackendError> {
        self.inner.execute_command_buffer(cmd)?;
        let index = self.executed;
        self.executed += 1;
        if self.fail_at == Some(index) {
            return Err(BackendError::NoRenderTarget);
        }
        Ok(())
    }
}

#[test]
fn failed_band_still_releases_the_scratch_target() {
    let (layers, _) = table(&[0, 1]);
    let mut pass = Deferred2DShadingPass::new(Renderer2DData::default(), layers).unwrap();
    let mut ctx = FailingBatch { inner: CommandRecorder::new(), fail_at: Some(0), executed: 0 };

    let err = pass.execute(&mut ctx, &rendering(), &LightSet::new()).unwrap_err();
    assert!(matches!(err, Deferred2DError::Backend(BackendError::NoRenderTarget)));
    assert_eq!(ctx.inner.live_targets(), 0);
    // Failed band plus the release; the second band is never submitted.
    assert_eq!(ctx.executed, 2);
    assert_eq!(
        ctx.inner.batches()[1],
        [RenderCommand::ReleaseTemporaryTarget(pass.base_color_target().unwrap())]
    );

    ctx.fail_at = None;
    pass.execute(&mut ctx, &rendering(), &LightSet::new()).unwrap();
    assert_eq!(pass.last_stats().bands, 2);
    assert_eq!(ctx.inner.live_targets(), 0);
}

#[test]
fn zero_hdr_scale_records_an_infinite_inverse() {
    let (layers, ids) = table(&[0]);
    let mut lights = LightSet::new();
    lights.add(Light::parametric(8, 1.0).with_layers([ids[0]]));

    let data = Renderer2DData { hdr_emulation_scale: 0.0, ..Default::default() };
    let mut pass = Deferred2DShadingPass::new(data, layers).unwrap();
    let mut rec = CommandRecorder::new();
    pass.execute(&mut rec, &rendering(), &lights).unwrap();

    let inverse: Vec<f32> = rec
        .commands()
        .filter_map(|c| match c {
            RenderCommand::SetGlobalFloat(GlobalFloat::InverseHdrEmulationScale, v) => Some(*v),
            _ => None,
        })
        .collect();
    assert_eq!(inverse.len(), 1);
    assert!(inverse[0].is_infinite());
}
