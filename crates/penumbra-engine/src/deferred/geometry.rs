use crate::cmd::{CommandBuffer, LoadAction, RenderTargetRef, StoreAction, TargetId};
use crate::paint::Color;
use crate::scene::{
    DrawingSettings, FilteringSettings, LayerMask, RenderQueueRange, ShaderTagId, SortingCriteria,
};

use super::LayerBand;

/// Selects every drawable whose sort value falls inside `band`.
pub fn band_filter(band: &LayerBand<'_>) -> FilteringSettings {
    FilteringSettings {
        render_queue_range: RenderQueueRange::ALL,
        layer_mask: LayerMask::ALL,
        rendering_layer_mask: u32::MAX,
        sorting_layer_range: band.range(),
    }
}

/// G-buffer pass, back to front.
pub fn gbuffer_drawing_settings() -> DrawingSettings {
    DrawingSettings::new(ShaderTagId::GBUFFER, SortingCriteria::CommonTransparent)
}

/// Records the unlit geometry of `band` into the scratch target.
pub(super) fn record_geometry(cmd: &mut CommandBuffer, band: &LayerBand<'_>, scratch: TargetId) {
    cmd.set_render_target(
        RenderTargetRef::Temporary(scratch),
        LoadAction::DontCare,
        StoreAction::Store,
        Some(Color::transparent()),
    );
    cmd.draw_renderers(band_filter(band), gbuffer_drawing_settings());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::RenderCommand;
    use crate::scene::{SortingLayer, SortingLayerId};

    #[test]
    fn filter_spans_band_and_nothing_else() {
        let layer = SortingLayer::new(SortingLayerId(3), "Mid", 7);
        let band = LayerBand { layer: &layer, lower: 7, upper: 7 };
        let f = band_filter(&band);

        assert_eq!(f.render_queue_range, RenderQueueRange::ALL);
        assert_eq!(f.layer_mask, LayerMask::ALL);
        assert_eq!(f.rendering_layer_mask, u32::MAX);
        assert!(f.sorting_layer_range.contains(7));
        assert!(!f.sorting_layer_range.contains(6));
        assert!(!f.sorting_layer_range.contains(8));
    }

    #[test]
    fn records_clear_then_draw() {
        let layer = SortingLayer::new(SortingLayerId(0), "Only", 0);
        let band = LayerBand { layer: &layer, lower: i16::MIN, upper: i16::MAX };
        let scratch = TargetId::allocate();
        let mut cmd = CommandBuffer::new("test");

        record_geometry(&mut cmd, &band, scratch);

        assert_eq!(
            cmd.commands()[0],
            RenderCommand::SetRenderTarget {
                target: RenderTargetRef::Temporary(scratch),
                load: LoadAction::DontCare,
                store: StoreAction::Store,
                clear: Some(Color::transparent()),
            }
        );
        match &cmd.commands()[1] {
            RenderCommand::DrawRenderers { filter, drawing } => {
                assert_eq!(*filter, band_filter(&band));
                assert_eq!(drawing.shader_passes, vec![ShaderTagId::GBUFFER]);
                assert_eq!(drawing.sorting, SortingCriteria::CommonTransparent);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cmd.len(), 2);
    }
}
