use crate::scene::{SortingLayer, SortingLayerRange};

/// Inclusive sort-value range rendered as one unit, tied to one sorting layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerBand<'a> {
    pub layer: &'a SortingLayer,
    pub lower: i16,
    pub upper: i16,
}

impl LayerBand<'_> {
    #[inline]
    pub fn range(&self) -> SortingLayerRange {
        SortingLayerRange::new(self.lower, self.upper)
    }

    #[inline]
    pub fn contains(&self, value: i16) -> bool {
        self.range().contains(value)
    }

    /// Profiling scope label for this band.
    pub fn sample_name(&self) -> String {
        format!("Sorting Layer - {}", self.layer.name)
    }
}

/// One band per layer, in list order.
///
/// Interior bands cover exactly their layer's value. The first band reaches
/// down to `i16::MIN` and the last band up to `i16::MAX`, so drawables that
/// override their sort value to an extreme (to stay behind or in front of
/// everything) still land in a band.
pub fn enumerate_bands(layers: &[SortingLayer]) -> Vec<LayerBand<'_>> {
    let last = layers.len().saturating_sub(1);
    layers
        .iter()
        .enumerate()
        .map(|(i, layer)| LayerBand {
            layer,
            lower: if i == 0 { i16::MIN } else { layer.value },
            upper: if i == last { i16::MAX } else { layer.value },
        })
        .collect()
}
