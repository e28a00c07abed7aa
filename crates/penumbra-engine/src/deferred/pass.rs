use crate::cmd::{
    CommandBuffer, GlobalMatrix, GlobalTexture, Material, RenderContext, TargetDescriptor,
    TargetFormat, TargetId, TextureRef,
};
use crate::light::LightRegistry;
use crate::scene::{Camera2D, SortingLayer, SortingLayerSource};

use super::geometry::record_geometry;
use super::lighting::LightingStage;
use super::{Deferred2DError, Renderer2DData, enumerate_bands};

const BUFFER_NAME: &str = "2D Deferred Shading";

/// Per-execute camera inputs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderingData {
    pub camera: Camera2D,
    /// Camera target size in pixels.
    pub target_width: u32,
    pub target_height: u32,
}

/// Counters from the last execute, for diagnostics.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ShadingStats {
    pub bands: u32,
    /// Bands lit by a global light rather than the black fallback.
    pub global_lights: u32,
    pub shaped_draws: u32,
}

#[derive(Debug)]
struct LightMaterials {
    global: Material,
    shape: Material,
}

/// Deferred shading of 2D scenes, one sorting-layer band at a time.
///
/// For every band the unlit geometry is drawn into a scratch target which the
/// light shaders then read while compositing onto the camera color target.
pub struct Deferred2DShadingPass<S: SortingLayerSource> {
    data: Renderer2DData,
    source: S,
    sorting_layers: Vec<SortingLayer>,
    base_color: Option<TargetId>,
    materials: Option<LightMaterials>,
    cmd: CommandBuffer,
    last_stats: ShadingStats,
}

impl<S: SortingLayerSource> Deferred2DShadingPass<S> {
    pub fn new(data: Renderer2DData, source: S) -> Result<Self, Deferred2DError> {
        data.validate()?;
        let sorting_layers = source.sorting_layers();
        log::debug!(
            "deferred 2D pass: {} sorting layers, {} blend styles",
            sorting_layers.len(),
            data.light_blend_styles.len()
        );
        Ok(Self {
            data,
            source,
            sorting_layers,
            base_color: None,
            materials: None,
            cmd: CommandBuffer::new(BUFFER_NAME),
            last_stats: ShadingStats::default(),
        })
    }

    /// Records and submits one frame of deferred shading.
    pub fn execute<C, R>(
        &mut self,
        ctx: &mut C,
        rendering: &RenderingData,
        lights: &R,
    ) -> Result<(), Deferred2DError>
    where
        C: RenderContext + ?Sized,
        R: LightRegistry,
    {
        let materials = resolve_materials(&mut self.materials, &self.data)?;

        if !self.source.is_playing() {
            self.sorting_layers = self.source.sorting_layers();
        }

        let base_color = *self.base_color.get_or_insert_with(TargetId::allocate);
        let stage = LightingStage {
            global_material: &materials.global,
            shape_material: &materials.shape,
            blend_styles: &self.data.light_blend_styles,
            hdr_emulation_scale: self.data.hdr_emulation_scale,
        };

        let cmd = &mut self.cmd;
        cmd.clear();
        cmd.get_temporary_target(
            base_color,
            TargetDescriptor::color(
                rendering.target_width,
                rendering.target_height,
                TargetFormat::Rgba8Unorm,
            ),
        );
        cmd.set_global_texture(GlobalTexture::BaseColor, TextureRef::Target(base_color));
        cmd.set_global_matrix(GlobalMatrix::ViewProjection, rendering.camera.view_projection());

        let mut stats = ShadingStats::default();
        let mut submitted = Ok(());
        for band in enumerate_bands(&self.sorting_layers) {
            log::trace!("band {:?}: [{}, {}]", band.layer.name, band.lower, band.upper);
            let sample = band.sample_name();
            cmd.begin_sample(sample.clone());

            record_geometry(cmd, &band, base_color);

            let layer = band.layer.id;
            let light_stats = lights.light_stats_by_layer(layer);
            let summary = stage.record(cmd, lights, layer, &light_stats, &rendering.camera);

            cmd.end_sample(sample);
            submitted = ctx.execute_command_buffer(cmd);
            cmd.clear();
            if submitted.is_err() {
                break;
            }

            stats.bands += 1;
            stats.global_lights += u32::from(summary.global_light);
            stats.shaped_draws += summary.shaped_draws;
        }

        // Released even after a failed band so the next frame can acquire it again.
        cmd.release_temporary_target(base_color);
        let released = ctx.execute_command_buffer(cmd);
        cmd.clear();
        submitted.and(released)?;

        self.last_stats = stats;
        Ok(())
    }

    pub fn data(&self) -> &Renderer2DData {
        &self.data
    }

    /// Sorting layers the next execute renders, unless refreshed first.
    pub fn sorting_layers(&self) -> &[SortingLayer] {
        &self.sorting_layers
    }

    /// Scratch target id, once the first execute has assigned it.
    pub fn base_color_target(&self) -> Option<TargetId> {
        self.base_color
    }

    pub fn last_stats(&self) -> ShadingStats {
        self.last_stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

/// Materials for the configured shaders, built on first use.
fn resolve_materials<'m>(
    slot: &'m mut Option<LightMaterials>,
    data: &Renderer2DData,
) -> Result<&'m LightMaterials, Deferred2DError> {
    let materials = match slot.take() {
        Some(materials) => materials,
        None => {
            let global = data
                .global_light_shader
                .clone()
                .ok_or(Deferred2DError::MissingShader("global light"))?;
            let shape = data
                .shape_light_shader
                .clone()
                .ok_or(Deferred2DError::MissingShader("shape light"))?;
            LightMaterials { global: Material::new(global), shape: Material::new(shape) }
        }
    };
    Ok(slot.insert(materials))
}
