//! Deferred 2D shading pass.
//!
//! Per frame the pass walks the sorting layers as contiguous sort-value bands.
//! For each band it draws the band's geometry unlit into a scratch color target,
//! then composites light onto the camera target: one full-screen global-light
//! draw, followed by every visible shaped light of every used blend style.
//!
//! Everything is recorded into a `cmd::CommandBuffer` and handed to a
//! `cmd::RenderContext`; the pass never talks to a device directly.

mod bands;
mod classify;
mod config;
mod error;
mod geometry;
mod lighting;
mod pass;

#[cfg(test)]
mod frame_tests;

pub use bands::{LayerBand, enumerate_bands};
pub use classify::{ShapedLight, find_global_light, shaped_lights};
pub use config::Renderer2DData;
pub use error::Deferred2DError;
pub use geometry::{band_filter, gbuffer_drawing_settings};
pub use pass::{Deferred2DShadingPass, RenderingData, ShadingStats};
