use super::{DrawingSettings, FilteringSettings, Shape, ShaderTagId, SortKey, SortingLayer};

/// A renderable item together with everything culling and sorting look at.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    /// Sort value of the drawable's sorting layer, or an override such as
    /// `i16::MIN`/`i16::MAX` to pin it behind/in front of everything.
    pub sort_value: i16,
    pub sorting_order: i16,
    pub render_queue: u32,
    /// Object layer, `0..32`.
    pub layer: u8,
    pub rendering_layer_mask: u32,
    /// Distance from the camera plane; larger is farther away.
    pub depth: f32,
    pub material_id: u32,
    /// Shader passes this drawable renders in.
    pub passes: Vec<ShaderTagId>,
    pub shape: Shape,
}

impl Drawable {
    /// Transparent-queue drawable on `layer`, rendered by the g-buffer pass.
    pub fn new(layer: &SortingLayer, shape: Shape) -> Self {
        Self {
            sort_value: layer.value,
            sorting_order: 0,
            render_queue: 3000,
            layer: 0,
            rendering_layer_mask: 1,
            depth: 0.0,
            material_id: 0,
            passes: vec![ShaderTagId::GBUFFER],
            shape,
        }
    }

    pub fn with_sort_value(mut self, value: i16) -> Self {
        self.sort_value = value;
        self
    }

    pub fn with_sorting_order(mut self, order: i16) -> Self {
        self.sorting_order = order;
        self
    }

    pub fn with_render_queue(mut self, queue: u32) -> Self {
        self.render_queue = queue;
        self
    }

    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_rendering_layer_mask(mut self, mask: u32) -> Self {
        self.rendering_layer_mask = mask;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_material(mut self, material_id: u32) -> Self {
        self.material_id = material_id;
        self
    }

    pub fn with_passes(mut self, passes: Vec<ShaderTagId>) -> Self {
        self.passes = passes;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DrawItem {
    drawable: Drawable,
    order: u32,
}

impl DrawItem {
    #[inline]
    fn key(&self) -> SortKey {
        let d = &self.drawable;
        SortKey {
            sort_value: d.sort_value,
            sorting_order: d.sorting_order,
            render_queue: d.render_queue,
            depth: d.depth,
            material_id: d.material_id,
            order: self.order,
        }
    }
}

/// Culled drawables for one camera and frame.
///
/// `DrawRenderers` commands are resolved against this list by the backend.
///
/// Performance characteristics:
/// - `push()` is O(1)
/// - `select_into()` reuses a caller-owned index buffer; no allocation once warmed
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a drawable and returns its index.
    #[inline]
    pub fn push(&mut self, drawable: Drawable) -> usize {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        self.items.push(DrawItem { drawable, order });
        self.items.len() - 1
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Drawable> {
        self.items.get(index).map(|i| &i.drawable)
    }

    /// Writes indices of matching drawables into `out`, in draw order.
    pub fn select_into(
        &self,
        filter: &FilteringSettings,
        drawing: &DrawingSettings,
        out: &mut Vec<usize>,
    ) {
        out.clear();
        out.extend(
            self.items
                .iter()
                .enumerate()
                .filter(|(_, item)| filter.matches(&item.drawable) && drawing.accepts(&item.drawable))
                .map(|(i, _)| i),
        );

        // Keys end in insertion order, so the order is total.
        out.sort_unstable_by(|&a, &b| {
            self.items[a].key().compare(&self.items[b].key(), drawing.sorting)
        });
    }

    /// Matching drawables in draw order.
    pub fn select(&self, filter: &FilteringSettings, drawing: &DrawingSettings) -> Vec<&Drawable> {
        let mut indices = Vec::new();
        self.select_into(filter, drawing, &mut indices);
        indices.into_iter().map(|i| &self.items[i].drawable).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::paint::Color;
    use crate::scene::{
        LayerMask, RenderQueueRange, SortingCriteria, SortingLayerId, SortingLayerRange,
    };

    fn layer(value: i16) -> SortingLayer {
        SortingLayer::new(SortingLayerId(value as u32), format!("L{value}"), value)
    }

    fn quad(layer_value: i16) -> Drawable {
        Drawable::new(
            &layer(layer_value),
            Shape::rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::transparent()),
        )
    }

    fn gbuffer() -> DrawingSettings {
        DrawingSettings::new(ShaderTagId::GBUFFER, SortingCriteria::CommonTransparent)
    }

    #[test]
    fn sorting_layer_range_filters_by_sort_value() {
        let mut list = DrawList::new();
        list.push(quad(-100));
        list.push(quad(0));
        list.push(quad(100));

        let mut filter = FilteringSettings::all();
        filter.sorting_layer_range = SortingLayerRange::new(0, 0);

        let picked = list.select(&filter, &gbuffer());
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].sort_value, 0);
    }

    #[test]
    fn every_filter_dimension_applies() {
        let mut list = DrawList::new();
        let keep = list.push(quad(0).with_layer(3).with_rendering_layer_mask(0b10));
        list.push(quad(0).with_layer(4));
        list.push(quad(0).with_render_queue(1000));
        list.push(quad(0).with_rendering_layer_mask(0b01));

        let filter = FilteringSettings {
            render_queue_range: RenderQueueRange::TRANSPARENT,
            layer_mask: LayerMask(1 << 3),
            rendering_layer_mask: 0b10,
            sorting_layer_range: SortingLayerRange::ALL,
        };

        let mut out = Vec::new();
        list.select_into(&filter, &gbuffer(), &mut out);
        assert_eq!(out, vec![keep]);
    }

    #[test]
    fn drawables_without_the_pass_are_skipped() {
        let mut list = DrawList::new();
        list.push(quad(0).with_passes(vec![ShaderTagId("Other")]));
        list.push(quad(0));
        assert_eq!(list.select(&FilteringSettings::all(), &gbuffer()).len(), 1);
    }

    #[test]
    fn warmed_index_buffer_is_reused() {
        let mut list = DrawList::new();
        for v in [-1, 0, 1, 0] {
            list.push(quad(v));
        }

        let mut out = Vec::new();
        list.select_into(&FilteringSettings::all(), &gbuffer(), &mut out);
        let (ptr, cap) = (out.as_ptr(), out.capacity());

        let mut filter = FilteringSettings::all();
        filter.sorting_layer_range = SortingLayerRange::new(0, 0);
        list.select_into(&filter, &gbuffer(), &mut out);
        assert_eq!(out, vec![1, 3]);
        assert_eq!((out.as_ptr(), out.capacity()), (ptr, cap));
    }

    #[test]
    fn transparent_sort_is_back_to_front_then_material_then_insertion() {
        let mut list = DrawList::new();
        let near = list.push(quad(0).with_depth(1.0));
        let far = list.push(quad(0).with_depth(5.0));
        let mat_b = list.push(quad(0).with_depth(3.0).with_material(2));
        let mat_a = list.push(quad(0).with_depth(3.0).with_material(1));
        let back_layer = list.push(quad(-1).with_depth(0.0));

        let mut out = Vec::new();
        list.select_into(&FilteringSettings::all(), &gbuffer(), &mut out);
        assert_eq!(out, vec![back_layer, far, mat_a, mat_b, near]);
    }

    #[test]
    fn opaque_sort_is_front_to_back() {
        let mut list = DrawList::new();
        let far = list.push(quad(0).with_depth(5.0));
        let near = list.push(quad(0).with_depth(1.0));

        let drawing = DrawingSettings::new(ShaderTagId::GBUFFER, SortingCriteria::CommonOpaque);
        let mut out = Vec::new();
        list.select_into(&FilteringSettings::all(), &drawing, &mut out);
        assert_eq!(out, vec![near, far]);
    }

    #[test]
    fn clear_resets_insertion_order() {
        let mut list = DrawList::new();
        list.push(quad(0));
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.push(quad(0)), 0);
    }
}
