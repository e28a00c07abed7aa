use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::render::RenderCtx;
use crate::scene::{Drawable, Shape};

use super::common::{
    QUAD_INDICES, QUAD_VERTICES, QuadVertex, color_pass, premul_alpha_blend, primitive_state,
    uniform_layout_entry,
};

const KIND_RECT: u32 = 0;
const KIND_ELLIPSE: u32 = 1;

/// Draws unlit drawables (rectangles and ellipses) as instanced quads.
///
/// Geometry is in world units and projected by the camera's view-projection.
/// Colors are linear premultiplied RGBA (`paint::Color`).
///
/// Several bands are encoded into one command encoder before submission, so
/// per-call data lives in buffers created for that call rather than in
/// buffers rewritten through the queue.
#[derive(Default)]
pub struct ShapeRenderer {
    pipelines: HashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    instances: Vec<ShapeInstance>,
}

impl ShapeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `drawables` in the given order onto `view`, loading its contents.
    pub fn render<'d>(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        format: wgpu::TextureFormat,
        drawables: impl IntoIterator<Item = &'d Drawable>,
        view_projection: Mat4,
    ) {
        self.instances.clear();
        self.instances
            .extend(drawables.into_iter().filter_map(|d| ShapeInstance::from_shape(&d.shape)));
        if self.instances.is_empty() {
            return;
        }

        self.ensure_pipeline(ctx, format);
        self.ensure_static_buffers(ctx);

        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(pipeline) = self.pipelines.get(&format) else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let globals = GeometryGlobals { view_proj: view_projection.to_cols_array_2d() };
        let ubo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("penumbra geometry globals"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("penumbra geometry bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
        });
        let instance_vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("penumbra geometry instances"),
            contents: bytemuck::cast_slice(&self.instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mut rpass = color_pass(encoder, "penumbra geometry pass", view, wgpu::LoadOp::Load);
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..self.instances.len() as u32);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, format: wgpu::TextureFormat) {
        if self.pipelines.contains_key(&format) {
            return;
        }

        let bgl = self.bind_group_layout.get_or_insert_with(|| {
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("penumbra geometry bgl"),
                entries: &[uniform_layout_entry::<GeometryGlobals>(0, wgpu::ShaderStages::VERTEX)],
            })
        });

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("penumbra geometry shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/geometry.wgsl").into()),
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("penumbra geometry pipeline layout"),
            bind_group_layouts: &[&*bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("penumbra geometry pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), ShapeInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("created geometry pipeline for {format:?}");
        self.pipelines.insert(format, pipeline);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("penumbra quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("penumbra quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GeometryGlobals {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct ShapeInstance {
    origin: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
    kind: u32,
}

impl ShapeInstance {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x4, // color
        4 => Uint32     // kind
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    /// `None` for empty or fully transparent shapes.
    fn from_shape(shape: &Shape) -> Option<Self> {
        let r = shape.bounds().normalized();
        let color = shape.color();
        if r.is_empty() || color.is_transparent() {
            return None;
        }
        let kind = match shape {
            Shape::Rect { .. } => KIND_RECT,
            Shape::Ellipse { .. } => KIND_ELLIPSE,
        };
        Some(Self {
            origin: [r.origin.x, r.origin.y],
            size: [r.size.x, r.size.y],
            color: color.to_array(),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::paint::Color;

    #[test]
    fn instance_layout_matches_wgsl() {
        // origin, size, color, kind
        assert_eq!(std::mem::size_of::<ShapeInstance>(), 8 + 8 + 16 + 4);
    }

    #[test]
    fn negative_sizes_are_normalized() {
        let shape = Shape::rect(Rect::new(2.0, 2.0, -1.0, -2.0), Color::from_premul(1.0, 0.0, 0.0, 1.0));
        let inst = ShapeInstance::from_shape(&shape).unwrap();
        assert_eq!(inst.origin, [1.0, 0.0]);
        assert_eq!(inst.size, [1.0, 2.0]);
        assert_eq!(inst.kind, KIND_RECT);
    }

    #[test]
    fn empty_and_transparent_shapes_are_dropped() {
        let empty = Shape::ellipse(Rect::new(0.0, 0.0, 0.0, 1.0), Color::from_premul(1.0, 1.0, 1.0, 1.0));
        assert!(ShapeInstance::from_shape(&empty).is_none());

        let clear = Shape::rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::transparent());
        assert!(ShapeInstance::from_shape(&clear).is_none());
    }

    #[test]
    fn ellipse_kind() {
        let shape = Shape::ellipse(Rect::new(0.0, 0.0, 2.0, 1.0), Color::from_premul(0.5, 0.5, 0.5, 0.5));
        assert_eq!(ShapeInstance::from_shape(&shape).unwrap().kind, KIND_ELLIPSE);
    }
}
