//! Light sources as the compositor sees them.
//!
//! A light describes itself (kind, color, falloff, mesh, cookie, target layers,
//! visibility); the `LightRegistry` answers the per-layer and per-blend-style
//! queries the shading pass issues every frame.

mod blend_style;
mod light;
mod mesh;
mod registry;
mod texture;

pub use blend_style::{BlendStyleMask, LightBlendStyle, MAX_BLEND_STYLES};
pub use light::{Light, LightKind};
pub use mesh::{LightMesh, LightVertex};
pub use registry::{LightHandle, LightRegistry, LightSet, LightStats};
pub use texture::{Texture2D, TextureId};
