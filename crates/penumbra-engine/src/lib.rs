//! Penumbra engine: a deferred 2D lighting compositor.
//!
//! The core is [`deferred::Deferred2DShadingPass`], which records each frame
//! into a [`cmd::CommandBuffer`] and hands it to a [`cmd::RenderContext`].
//! [`render::GpuBackend`] executes those streams with wgpu;
//! [`cmd::CommandRecorder`] captures them for tests and tooling.
//!
//! The `device`, `window`, `core` and `time` modules form a small runtime for
//! driving the pass in a window.

pub mod cmd;
pub mod coords;
pub mod deferred;
pub mod light;
pub mod paint;
pub mod scene;

pub mod render;

pub mod core;
pub mod device;
pub mod logging;
pub mod time;
pub mod window;
