//! Renderer-agnostic deferred command stream.
//!
//! Passes record [`RenderCommand`]s into a [`CommandBuffer`]; nothing touches
//! the GPU until a [`RenderContext`] executes the buffer. Two contexts ship with
//! the crate: the wgpu backend (`render::GpuBackend`) and [`CommandRecorder`],
//! which captures and validates streams without a device.
//!
//! Extending the stream:
//! - add a variant to `RenderCommand` plus a recording helper on `CommandBuffer`
//! - teach every `RenderContext` implementation to execute it

mod buffer;
mod command;
mod context;
mod error;
mod material;

pub use buffer::CommandBuffer;
pub use command::{
    GlobalColor, GlobalFloat, GlobalMatrix, GlobalTexture, GlobalVector, LoadAction, MeshRef,
    RenderCommand, RenderTargetRef, ShaderKeyword, StoreAction, TargetDescriptor, TargetFormat,
    TargetId, TextureRef,
};
pub use context::{CommandRecorder, RenderContext};
pub use error::BackendError;
pub use material::{Material, MaterialId, ShaderAsset, ShaderPassDesc};
