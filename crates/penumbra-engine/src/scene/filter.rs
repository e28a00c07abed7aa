//! Filtering and drawing settings for `DrawRenderers`.
//!
//! A drawable is drawn when it passes every `FilteringSettings` dimension and
//! carries at least one of the requested shader pass tags.

use super::list::Drawable;

/// Identifies a shader pass drawables can opt into.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderTagId(pub &'static str);

impl ShaderTagId {
    /// Geometry pass of the deferred 2D renderer: writes unlit base color.
    pub const GBUFFER: ShaderTagId = ShaderTagId("Penumbra2DGBuffer");
}

/// Inclusive render-queue range.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderQueueRange {
    pub lower: u32,
    pub upper: u32,
}

impl RenderQueueRange {
    pub const MAX_QUEUE: u32 = 5000;

    pub const ALL: RenderQueueRange = RenderQueueRange { lower: 0, upper: Self::MAX_QUEUE };
    pub const OPAQUE: RenderQueueRange = RenderQueueRange { lower: 0, upper: 2500 };
    pub const TRANSPARENT: RenderQueueRange =
        RenderQueueRange { lower: 2501, upper: Self::MAX_QUEUE };

    #[inline]
    pub fn contains(self, queue: u32) -> bool {
        (self.lower..=self.upper).contains(&queue)
    }
}

/// Bitmask over the 32 object layers. Bit `n` selects layer `n`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const NONE: LayerMask = LayerMask(0);

    #[inline]
    pub fn contains(self, layer: u8) -> bool {
        layer < 32 && self.0 & (1u32 << layer) != 0
    }
}

/// Inclusive range over sorting-layer sort values.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SortingLayerRange {
    pub lower: i16,
    pub upper: i16,
}

impl SortingLayerRange {
    pub const ALL: SortingLayerRange = SortingLayerRange { lower: i16::MIN, upper: i16::MAX };

    #[inline]
    pub const fn new(lower: i16, upper: i16) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(self, value: i16) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

/// Which drawables a `DrawRenderers` command selects.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FilteringSettings {
    pub render_queue_range: RenderQueueRange,
    pub layer_mask: LayerMask,
    pub rendering_layer_mask: u32,
    pub sorting_layer_range: SortingLayerRange,
}

impl FilteringSettings {
    /// Selects everything.
    pub const fn all() -> Self {
        Self {
            render_queue_range: RenderQueueRange::ALL,
            layer_mask: LayerMask::ALL,
            rendering_layer_mask: u32::MAX,
            sorting_layer_range: SortingLayerRange::ALL,
        }
    }

    pub fn matches(&self, d: &Drawable) -> bool {
        self.render_queue_range.contains(d.render_queue)
            && self.layer_mask.contains(d.layer)
            && self.rendering_layer_mask & d.rendering_layer_mask != 0
            && self.sorting_layer_range.contains(d.sort_value)
    }
}

impl Default for FilteringSettings {
    fn default() -> Self {
        Self::all()
    }
}

/// Draw ordering applied after filtering.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SortingCriteria {
    /// Sorting layer, order in layer, render queue, then back-to-front by
    /// depth, then grouped by material.
    CommonTransparent,
    /// Like `CommonTransparent` but front-to-back by depth.
    CommonOpaque,
}

/// Which shader passes to draw and in what order.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSettings {
    pub shader_passes: Vec<ShaderTagId>,
    pub sorting: SortingCriteria,
}

impl DrawingSettings {
    pub fn new(pass: ShaderTagId, sorting: SortingCriteria) -> Self {
        Self { shader_passes: vec![pass], sorting }
    }

    #[inline]
    pub fn accepts(&self, d: &Drawable) -> bool {
        d.passes.iter().any(|p| self.shader_passes.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_queue_range_is_inclusive() {
        assert!(RenderQueueRange::OPAQUE.contains(2500));
        assert!(!RenderQueueRange::OPAQUE.contains(2501));
        assert!(RenderQueueRange::ALL.contains(RenderQueueRange::MAX_QUEUE));
    }

    #[test]
    fn layer_mask_bits() {
        let m = LayerMask(0b101);
        assert!(m.contains(0));
        assert!(!m.contains(1));
        assert!(m.contains(2));
        assert!(LayerMask::ALL.contains(31));
        assert!(!LayerMask::ALL.contains(32));
    }

    #[test]
    fn sorting_layer_range_all_covers_extremes() {
        assert!(SortingLayerRange::ALL.contains(i16::MIN));
        assert!(SortingLayerRange::ALL.contains(i16::MAX));
        assert!(!SortingLayerRange::new(0, 0).contains(1));
    }
}
