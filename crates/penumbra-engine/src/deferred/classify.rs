use std::sync::Arc;

use crate::light::{Light, LightMesh, LightRegistry, LightStats};
use crate::scene::{Camera2D, SortingLayerId};

/// A shaped light that passed every per-frame check, with its mesh.
pub type ShapedLight<'a> = (&'a Light, &'a Arc<LightMesh>);

/// The single global light lighting `layer`, if any.
///
/// Used styles are scanned in index order (only the first `style_count` are
/// configured), lights in insertion order; the first global light targeting
/// the layer wins and scanning stops there.
pub fn find_global_light<'a, R: LightRegistry>(
    registry: &'a R,
    stats: &LightStats,
    layer: SortingLayerId,
    style_count: usize,
) -> Option<&'a Light> {
    stats
        .blend_styles_used
        .iter()
        .take_while(|&style| style < style_count)
        .find_map(|style| {
            registry
                .lights_by_blend_style(style)
                .find(|l| l.is_global() && l.is_lit_layer(layer))
        })
}

/// Non-global lights of `style` that target `layer`, are visible to `camera`
/// and have a non-empty mesh, in insertion order.
pub fn shaped_lights<'a, R: LightRegistry>(
    registry: &'a R,
    style: usize,
    layer: SortingLayerId,
    camera: &'a Camera2D,
) -> impl Iterator<Item = ShapedLight<'a>> + 'a {
    registry
        .lights_by_blend_style(style)
        .filter(move |l| !l.is_global() && l.is_lit_layer(layer) && l.is_visible(camera))
        .filter_map(|l| match l.mesh() {
            Some(mesh) if !mesh.is_empty() => Some((l, mesh)),
            _ => {
                log::trace!("skipping light without a renderable mesh");
                None
            }
        })
}
