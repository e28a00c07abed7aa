use std::collections::HashMap;

use glam::Mat4;

use crate::cmd::{
    BackendError, CommandBuffer, GlobalColor, GlobalFloat, GlobalMatrix, GlobalTexture,
    GlobalVector, LoadAction, Material, MeshRef, RenderCommand, RenderContext, RenderTargetRef,
    ShaderKeyword, TextureRef,
};
use crate::coords::{ColorRgba, Vec2};
use crate::light::{Texture2D, TextureId};
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::DrawList;

use super::common::color_pass;
use super::falloff::upload_falloff_lookup;
use super::geometry::ShapeRenderer;
use super::lights::{FLAG_SPRITE_LIGHT, LightDraw, LightRenderer, LightUniforms};
use super::targets::TargetPool;

/// wgpu executor of the deferred command stream.
///
/// Long-lived: owns pipelines, the transient target pool and uploaded
/// textures. Each frame borrows it through [`GpuBackend::begin_frame`], which
/// yields the [`RenderContext`] the shading pass executes against.
#[derive(Default)]
pub struct GpuBackend {
    targets: TargetPool,
    shapes: ShapeRenderer,
    lights: LightRenderer,
    textures: TextureCache,
    /// `DrawList::select_into` output, reused across `DrawRenderers`.
    selection: Vec<usize>,
}

impl GpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts encoding a frame onto `target`.
    ///
    /// `draws` is the culling result `DrawRenderers` commands select from.
    pub fn begin_frame<'a>(
        &'a mut self,
        ctx: RenderCtx<'a>,
        target: RenderTarget<'a>,
        draws: &'a DrawList,
    ) -> GpuContext<'a> {
        GpuContext {
            backend: self,
            ctx,
            target,
            draws,
            state: ShaderState::default(),
            bound: None,
            debug_groups: 0,
        }
    }
}

/// Global shader inputs, as last set by the command stream.
#[derive(Debug, Clone)]
struct ShaderState {
    light_color: ColorRgba,
    falloff_intensity: f32,
    falloff_distance: f32,
    falloff_offset: Vec2,
    volume_opacity: f32,
    hdr_scale: f32,
    inv_hdr_scale: f32,
    base_color: Option<TextureRef>,
    falloff_lookup: TextureRef,
    cookie: TextureRef,
    view_projection: Mat4,
    sprite_light: bool,
    additive: bool,
}

impl Default for ShaderState {
    fn default() -> Self {
        Self {
            light_color: ColorRgba::black(),
            falloff_intensity: 0.0,
            falloff_distance: 0.0,
            falloff_offset: Vec2::zero(),
            volume_opacity: 0.0,
            hdr_scale: 1.0,
            inv_hdr_scale: 1.0,
            base_color: None,
            falloff_lookup: TextureRef::FalloffLookup,
            cookie: TextureRef::White,
            view_projection: Mat4::IDENTITY,
            sprite_light: false,
            additive: false,
        }
    }
}

/// One frame's execution context over a [`GpuBackend`].
///
/// Commands are encoded into the frame's encoder; nothing is submitted here.
pub struct GpuContext<'a> {
    backend: &'a mut GpuBackend,
    ctx: RenderCtx<'a>,
    target: RenderTarget<'a>,
    draws: &'a DrawList,
    state: ShaderState,
    bound: Option<RenderTargetRef>,
    debug_groups: usize,
}

impl GpuContext<'_> {
    /// Closes debug groups left open by a failed execute and recycles targets.
    ///
    /// Temporary targets never outlive the frame; any still allocated are
    /// reclaimed here.
    pub fn finish(self) {
        for _ in 0..self.debug_groups {
            self.target.encoder.pop_debug_group();
        }
        let leaked = self.backend.targets.reclaim_live();
        if leaked > 0 {
            log::warn!("{leaked} temporary targets were not released this frame");
        }
        self.backend.targets.trim();
        self.backend.textures.trim();
    }

    fn execute(&mut self, cmd: &RenderCommand) -> Result<(), BackendError> {
        match cmd {
            RenderCommand::BeginSample(name) => {
                self.target.encoder.push_debug_group(name);
                self.debug_groups += 1;
            }
            RenderCommand::EndSample(name) => {
                if self.debug_groups == 0 {
                    return Err(BackendError::UnbalancedSample(name.clone()));
                }
                self.target.encoder.pop_debug_group();
                self.debug_groups -= 1;
            }
            RenderCommand::GetTemporaryTarget { id, descriptor } => {
                self.backend.targets.acquire(self.ctx.device, *id, *descriptor)?;
            }
            RenderCommand::ReleaseTemporaryTarget(id) => {
                self.backend.targets.release(*id)?;
                if self.bound == Some(RenderTargetRef::Temporary(*id)) {
                    self.bound = None;
                }
            }
            RenderCommand::SetRenderTarget { target, load, clear, .. } => {
                self.bound = Some(*target);
                let (view, _) = resolve_target(
                    self.bound,
                    self.target.color_view,
                    self.ctx.surface_format,
                    &self.backend.targets,
                )?;
                match (clear, load) {
                    (Some(color), _) => {
                        color_pass(
                            self.target.encoder,
                            "penumbra clear",
                            view,
                            wgpu::LoadOp::Clear(color.to_wgpu()),
                        );
                    }
                    (None, LoadAction::Load | LoadAction::DontCare) => {}
                }
            }
            RenderCommand::DrawRenderers { filter, drawing } => {
                let (view, format) = resolve_target(
                    self.bound,
                    self.target.color_view,
                    self.ctx.surface_format,
                    &self.backend.targets,
                )?;
                let draws = self.draws;
                draws.select_into(filter, drawing, &mut self.backend.selection);
                self.backend.shapes.render(
                    &self.ctx,
                    self.target.encoder,
                    view,
                    format,
                    self.backend.selection.iter().filter_map(|&i| draws.get(i)),
                    self.state.view_projection,
                );
            }
            RenderCommand::SetGlobalColor(GlobalColor::LightColor, c) => self.state.light_color = *c,
            RenderCommand::SetGlobalFloat(slot, v) => match slot {
                GlobalFloat::FalloffIntensity => self.state.falloff_intensity = *v,
                GlobalFloat::FalloffDistance => self.state.falloff_distance = *v,
                GlobalFloat::VolumeOpacity => self.state.volume_opacity = *v,
                GlobalFloat::HdrEmulationScale => self.state.hdr_scale = *v,
                GlobalFloat::InverseHdrEmulationScale => self.state.inv_hdr_scale = *v,
            },
            RenderCommand::SetGlobalVector(GlobalVector::FalloffOffset, v) => {
                self.state.falloff_offset = *v;
            }
            RenderCommand::SetGlobalTexture(slot, texture) => {
                if let TextureRef::Target(id) = texture {
                    self.backend.targets.view(*id)?;
                }
                match slot {
                    GlobalTexture::BaseColor => self.state.base_color = Some(texture.clone()),
                    GlobalTexture::FalloffLookup => self.state.falloff_lookup = texture.clone(),
                    GlobalTexture::Cookie => self.state.cookie = texture.clone(),
                }
            }
            RenderCommand::SetGlobalMatrix(GlobalMatrix::ViewProjection, m) => {
                self.state.view_projection = *m;
            }
            RenderCommand::EnableKeyword(k) => self.set_keyword(*k, true),
            RenderCommand::DisableKeyword(k) => self.set_keyword(*k, false),
            RenderCommand::DrawMesh { mesh, transform, material, pass } => {
                self.draw_mesh(mesh, *transform, material, *pass)?;
            }
        }
        Ok(())
    }

    fn set_keyword(&mut self, keyword: ShaderKeyword, on: bool) {
        match keyword {
            ShaderKeyword::SpriteLight => self.state.sprite_light = on,
            ShaderKeyword::UseAdditiveBlending => self.state.additive = on,
        }
    }

    fn draw_mesh(
        &mut self,
        mesh: &MeshRef,
        transform: Mat4,
        material: &Material,
        pass: u32,
    ) -> Result<(), BackendError> {
        let base = self.state.base_color.clone().unwrap_or(TextureRef::White);
        for texture in [&base, &self.state.falloff_lookup, &self.state.cookie] {
            self.backend.textures.ensure(&self.ctx, texture);
        }

        let s = &self.state;
        let uniforms = LightUniforms {
            view_proj: s.view_projection.to_cols_array_2d(),
            model: transform.to_cols_array_2d(),
            light_color: s.light_color.to_array(),
            falloff_offset: s.falloff_offset.to_array(),
            falloff_intensity: s.falloff_intensity,
            falloff_distance: s.falloff_distance,
            volume_opacity: s.volume_opacity,
            hdr_scale: s.hdr_scale,
            inv_hdr_scale: s.inv_hdr_scale,
            flags: if s.sprite_light { FLAG_SPRITE_LIGHT } else { 0 },
            target_size: [self.target.width as f32, self.target.height as f32],
            _pad: [0.0; 2],
        };

        let (view, format) = resolve_target(
            self.bound,
            self.target.color_view,
            self.ctx.surface_format,
            &self.backend.targets,
        )?;
        let textures = &self.backend.textures;
        let targets = &self.backend.targets;
        let draw = LightDraw {
            mesh,
            material,
            pass,
            // Full-screen passes always composite source-over.
            additive: s.additive && matches!(mesh, MeshRef::Light(_)),
            uniforms,
            base: textures.view(&base, targets)?,
            falloff: textures.view(&s.falloff_lookup, targets)?,
            cookie: textures.view(&s.cookie, targets)?,
        };
        self.backend.lights.draw(&self.ctx, self.target.encoder, view, format, &draw)
    }
}

/// View and format of the bound render target.
fn resolve_target<'v>(
    bound: Option<RenderTargetRef>,
    camera_view: &'v wgpu::TextureView,
    camera_format: wgpu::TextureFormat,
    targets: &'v TargetPool,
) -> Result<(&'v wgpu::TextureView, wgpu::TextureFormat), BackendError> {
    match bound.ok_or(BackendError::NoRenderTarget)? {
        RenderTargetRef::CameraColor => Ok((camera_view, camera_format)),
        RenderTargetRef::Temporary(id) => Ok((targets.view(id)?, targets.format(id)?)),
    }
}

impl RenderContext for GpuContext<'_> {
    fn execute_command_buffer(&mut self, cmd: &CommandBuffer) -> Result<(), BackendError> {
        log::trace!("executing '{}' ({} commands)", cmd.name(), cmd.len());
        cmd.commands().iter().try_for_each(|c| self.execute(c))
    }
}

type GpuImage = (wgpu::Texture, wgpu::TextureView);

/// Sampled textures that are not render targets.
///
/// Images are keyed by `TextureId` and dropped after a frame that did not
/// bind them.
#[derive(Default)]
struct TextureCache {
    white: Option<GpuImage>,
    falloff: Option<GpuImage>,
    images: HashMap<TextureId, (GpuImage, u64)>,
    frame: u64,
}

impl TextureCache {
    fn ensure(&mut self, ctx: &RenderCtx<'_>, texture: &TextureRef) {
        match texture {
            TextureRef::Target(_) => {}
            TextureRef::White => {
                if self.white.is_none() {
                    self.white = Some(upload_image(ctx, &Texture2D::solid([255; 4])));
                }
            }
            TextureRef::FalloffLookup => {
                if self.falloff.is_none() {
                    self.falloff = Some(upload_falloff_lookup(ctx.device, ctx.queue));
                }
            }
            TextureRef::Image(image) if !image.is_valid() => self.ensure(ctx, &TextureRef::White),
            TextureRef::Image(image) => {
                let frame = self.frame;
                self.images
                    .entry(image.id())
                    .or_insert_with(|| (upload_image(ctx, image), frame))
                    .1 = frame;
            }
        }
    }

    /// Ends a frame: drops images it did not use.
    fn trim(&mut self) {
        evict_unused(&mut self.images, self.frame);
        self.frame += 1;
    }

    /// Invalid images resolve to white, like an unbound cookie.
    fn view<'t>(
        &'t self,
        texture: &TextureRef,
        targets: &'t TargetPool,
    ) -> Result<&'t wgpu::TextureView, BackendError> {
        let cached = match texture {
            TextureRef::Target(id) => return targets.view(*id),
            TextureRef::White => self.white.as_ref(),
            TextureRef::FalloffLookup => self.falloff.as_ref(),
            TextureRef::Image(image) => {
                self.images.get(&image.id()).map(|(img, _)| img).or(self.white.as_ref())
            }
        };
        cached.map(|(_, view)| view).ok_or(BackendError::TextureNotUploaded)
    }
}

/// Keeps entries last used in `frame`.
fn evict_unused<V>(entries: &mut HashMap<TextureId, (V, u64)>, frame: u64) {
    let before = entries.len();
    entries.retain(|_, (_, last_used)| *last_used == frame);
    if entries.len() != before {
        log::debug!("evicted {} unused images", before - entries.len());
    }
}

fn upload_image(ctx: &RenderCtx<'_>, image: &Texture2D) -> (wgpu::Texture, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width: image.width(),
        height: image.height(),
        depth_or_array_layers: 1,
    };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("penumbra image"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        image.pixels(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width()),
            rows_per_image: Some(image.height()),
        },
        size,
    );
    log::debug!("uploaded image {:?} ({}x{})", image.id(), image.width(), image.height());
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_unused_for_a_frame_are_evicted() {
        let kept = Texture2D::solid([255; 4]).id();
        let stale = Texture2D::solid([0; 4]).id();
        let mut entries: HashMap<TextureId, ((), u64)> = HashMap::new();
        entries.insert(kept, ((), 3));
        entries.insert(stale, ((), 2));

        evict_unused(&mut entries, 3);
        assert!(entries.contains_key(&kept));
        assert!(!entries.contains_key(&stale));

        evict_unused(&mut entries, 4);
        assert!(entries.is_empty());
    }
}
