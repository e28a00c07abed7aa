//! Shaders bundled with the crate.

use std::sync::Arc;

use crate::cmd::{ShaderAsset, ShaderPassDesc};

/// Full-screen global light. Pass 0 only.
pub const GLOBAL_LIGHT_PASS: u32 = 0;
/// Volumetric glow of a shaped light.
pub const SHAPE_VOLUME_PASS: u32 = 0;
/// Lit contribution of a shaped light.
pub const SHAPE_LIGHT_PASS: u32 = 1;

pub fn global_light_shader() -> Arc<ShaderAsset> {
    Arc::new(ShaderAsset::new(
        "Penumbra/GlobalLight2D",
        include_str!("shaders/global_light.wgsl"),
        vec![ShaderPassDesc::new("vs_fullscreen", "fs_global")],
    ))
}

pub fn shape_light_shader() -> Arc<ShaderAsset> {
    Arc::new(ShaderAsset::new(
        "Penumbra/ShapeLight2D",
        include_str!("shaders/shape_light.wgsl"),
        vec![
            ShaderPassDesc::new("vs_shape", "fs_volume"),
            ShaderPassDesc::new("vs_shape", "fs_light"),
        ],
    ))
}
