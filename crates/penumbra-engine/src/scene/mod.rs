//! Scene-side inputs of the compositor.
//!
//! Responsibilities:
//! - sorting layers (ordered, named, valued) and their sources
//! - the 2D camera the frame is rendered from
//! - drawables plus the filtering/sorting contract the backend resolves
//!   `DrawRenderers` commands against (the "culling results")

mod camera;
mod filter;
mod key;
mod list;
mod shape;
mod sorting_layer;

pub use camera::Camera2D;
pub use filter::{
    DrawingSettings, FilteringSettings, LayerMask, RenderQueueRange, ShaderTagId, SortingCriteria,
    SortingLayerRange,
};
pub use key::SortKey;
pub use list::{DrawList, Drawable};
pub use shape::Shape;
pub use sorting_layer::{SortingLayer, SortingLayerId, SortingLayerSource, SortingLayerTable};
