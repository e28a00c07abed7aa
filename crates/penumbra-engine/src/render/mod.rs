//! wgpu backend for the deferred command stream.
//!
//! `GpuBackend` owns every GPU resource (pipelines, transient targets, uploaded
//! textures) and hands out a per-frame `GpuContext` implementing
//! `cmd::RenderContext`. Renderers create their pipelines lazily on first use
//! and key them by target format.
//!
//! Convention:
//! - geometry is in world units, +Y up, projected by the camera's
//!   view-projection matrix (`GlobalMatrix::ViewProjection`)
//! - colors are linear premultiplied RGBA

mod backend;
pub mod builtin;
mod common;
mod ctx;
mod falloff;
mod geometry;
mod lights;
mod targets;

pub use backend::{GpuBackend, GpuContext};
pub use ctx::{RenderCtx, RenderTarget};
pub use falloff::{FALLOFF_LUT_HEIGHT, FALLOFF_LUT_WIDTH, bake_falloff_lookup, falloff_exponent};
pub use geometry::ShapeRenderer;
pub use lights::LightRenderer;
