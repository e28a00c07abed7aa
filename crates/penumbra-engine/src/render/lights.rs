use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::cmd::{BackendError, Material, MaterialId, MeshRef};
use crate::light::LightVertex;
use crate::render::RenderCtx;

use super::common::{
    additive_blend, color_pass, premul_alpha_blend, primitive_state, texture_layout_entry,
    uniform_layout_entry,
};

pub(super) const FLAG_SPRITE_LIGHT: u32 = 1;

/// Uniform block shared by the light shaders. Mirrors `LightUniforms` in WGSL.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct LightUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub light_color: [f32; 4],
    pub falloff_offset: [f32; 2],
    pub falloff_intensity: f32,
    pub falloff_distance: f32,
    pub volume_opacity: f32,
    pub hdr_scale: f32,
    pub inv_hdr_scale: f32,
    pub flags: u32,
    pub target_size: [f32; 2],
    pub _pad: [f32; 2],
}

/// Everything one `DrawMesh` needs.
pub(super) struct LightDraw<'a> {
    pub mesh: &'a MeshRef,
    pub material: &'a Material,
    pub pass: u32,
    pub additive: bool,
    pub uniforms: LightUniforms,
    pub base: &'a wgpu::TextureView,
    pub falloff: &'a wgpu::TextureView,
    pub cookie: &'a wgpu::TextureView,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    material: MaterialId,
    pass: u32,
    fullscreen: bool,
    additive: bool,
    format: wgpu::TextureFormat,
}

/// Draws light meshes and full-screen light passes with material shaders.
///
/// One bind-group layout serves every light shader: uniforms, base color,
/// falloff lookup, cookie and a linear clamp sampler. Pipelines are created on
/// first use per material pass, mesh kind, blend mode and target format.
#[derive(Default)]
pub struct LightRenderer {
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: Option<wgpu::PipelineLayout>,
    sampler: Option<wgpu::Sampler>,
    modules: HashMap<MaterialId, wgpu::ShaderModule>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl LightRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        format: wgpu::TextureFormat,
        draw: &LightDraw<'_>,
    ) -> Result<(), BackendError> {
        let fullscreen = matches!(draw.mesh, MeshRef::Fullscreen);
        let key = PipelineKey {
            material: draw.material.id(),
            pass: draw.pass,
            fullscreen,
            additive: draw.additive,
            format,
        };
        self.ensure_layout(ctx);
        self.ensure_pipeline(ctx, key, draw.material)?;

        let Some(bgl) = self.bind_group_layout.as_ref() else { return Ok(()) };
        let Some(sampler) = self.sampler.as_ref() else { return Ok(()) };
        let Some(pipeline) = self.pipelines.get(&key) else { return Ok(()) };

        let ubo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("penumbra light uniforms"),
            contents: bytemuck::bytes_of(&draw.uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("penumbra light bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(draw.base) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::TextureView(draw.falloff) },
                wgpu::BindGroupEntry { binding: 3, resource: wgpu::BindingResource::TextureView(draw.cookie) },
                wgpu::BindGroupEntry { binding: 4, resource: wgpu::BindingResource::Sampler(sampler) },
            ],
        });

        match draw.mesh {
            MeshRef::Fullscreen => {
                let mut rpass = color_pass(encoder, "penumbra global light", view, wgpu::LoadOp::Load);
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &bind_group, &[]);
                rpass.draw(0..3, 0..1);
            }
            MeshRef::Light(mesh) => {
                if mesh.is_empty() {
                    return Ok(());
                }
                let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("penumbra light mesh vbo"),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("penumbra light mesh ibo"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let mut rpass = color_pass(encoder, "penumbra shape light", view, wgpu::LoadOp::Load);
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &bind_group, &[]);
                rpass.set_vertex_buffer(0, vbo.slice(..));
                rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.indices.len() as u32, 0, 0..1);
            }
        }
        Ok(())
    }

    fn ensure_layout(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_layout.is_some() {
            return;
        }

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("penumbra light bgl"),
            entries: &[
                uniform_layout_entry::<LightUniforms>(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ),
                texture_layout_entry(1),
                texture_layout_entry(2),
                texture_layout_entry(3),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("penumbra light pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("penumbra light sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));
        self.bind_group_layout = Some(bgl);
        self.pipeline_layout = Some(layout);
    }

    fn ensure_pipeline(
        &mut self,
        ctx: &RenderCtx<'_>,
        key: PipelineKey,
        material: &Material,
    ) -> Result<(), BackendError> {
        if self.pipelines.contains_key(&key) {
            return Ok(());
        }
        let shader = material.shader();
        let pass = shader.pass(key.pass).ok_or_else(|| BackendError::MissingShaderPass {
            shader: shader.name.to_string(),
            pass: key.pass,
        })?;
        let Some(layout) = self.pipeline_layout.as_ref() else { return Ok(()) };

        let module: &wgpu::ShaderModule = self.modules.entry(key.material).or_insert_with(|| {
            log::debug!("compiling light shader '{}'", shader.name);
            ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(shader.name.as_ref()),
                source: wgpu::ShaderSource::Wgsl(shader.source.clone()),
            })
        });

        let mesh_layout = [light_vertex_layout()];
        let buffers: &[wgpu::VertexBufferLayout<'_>] =
            if key.fullscreen { &[] } else { &mesh_layout };
        let blend = if key.additive { additive_blend() } else { premul_alpha_blend() };

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(shader.name.as_ref()),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some(pass.vertex_entry),
                compilation_options: Default::default(),
                buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(pass.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!(
            "created light pipeline '{}' pass {} (additive: {})",
            shader.name,
            key.pass,
            key.additive
        );
        self.pipelines.insert(key, pipeline);
        Ok(())
    }
}

const LIGHT_VERTEX_ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x2, // position
    1 => Float32x2, // extrude
    2 => Float32,   // falloff
    3 => Float32x2  // uv
];

fn light_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<LightVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &LIGHT_VERTEX_ATTRS,
    }
}
