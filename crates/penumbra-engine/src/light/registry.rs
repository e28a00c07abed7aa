use crate::scene::SortingLayerId;

use super::{BlendStyleMask, Light};

/// Per-layer light summary.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LightStats {
    /// Blend styles with at least one light targeting the layer.
    pub blend_styles_used: BlendStyleMask,
    pub total_lights: u32,
    /// Lights with a non-zero volume opacity.
    pub total_volumetric_usage: u32,
}

/// Read-only light queries issued by the shading pass.
pub trait LightRegistry {
    /// Summary of the lights targeting `layer`.
    fn light_stats_by_layer(&self, layer: SortingLayerId) -> LightStats;

    /// Lights assigned to blend style `style`, in insertion order.
    ///
    /// The iterator is finite and can be requested again to restart.
    fn lights_by_blend_style(&self, style: usize) -> impl Iterator<Item = &Light> + '_;
}

/// Handle returned by [`LightSet::add`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LightHandle(usize);

/// Owning light registry.
///
/// Slots are never reused, so iteration order is insertion order even after
/// removals.
#[derive(Debug, Default)]
pub struct LightSet {
    slots: Vec<Option<Light>>,
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, light: Light) -> LightHandle {
        self.slots.push(Some(light));
        LightHandle(self.slots.len() - 1)
    }

    pub fn remove(&mut self, handle: LightHandle) -> Option<Light> {
        self.slots.get_mut(handle.0).and_then(Option::take)
    }

    pub fn get(&self, handle: LightHandle) -> Option<&Light> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, handle: LightHandle) -> Option<&mut Light> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Live lights in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Light> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

impl LightRegistry for LightSet {
    fn light_stats_by_layer(&self, layer: SortingLayerId) -> LightStats {
        self.iter()
            .filter(|l| l.is_lit_layer(layer))
            .fold(LightStats::default(), |mut stats, l| {
                stats.blend_styles_used.insert(l.blend_style);
                stats.total_lights += 1;
                if l.is_volumetric() {
                    stats.total_volumetric_usage += 1;
                }
                stats
            })
    }

    fn lights_by_blend_style(&self, style: usize) -> impl Iterator<Item = &Light> + '_ {
        self.iter().filter(move |l| l.blend_style == style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::ColorRgba;

    const BACK: SortingLayerId = SortingLayerId(0);
    const FRONT: SortingLayerId = SortingLayerId(1);

    fn global(style: usize, layers: &[SortingLayerId]) -> Light {
        Light::global(ColorRgba::white(), 1.0)
            .with_blend_style(style)
            .with_layers(layers.iter().copied())
    }

    #[test]
    fn stats_only_count_lights_on_the_layer() {
        let mut set = LightSet::new();
        set.add(global(0, &[BACK]));
        set.add(global(2, &[BACK, FRONT]).with_volume_opacity(0.3));
        set.add(global(5, &[FRONT]));

        let back = set.light_stats_by_layer(BACK);
        assert_eq!(back.blend_styles_used.iter().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(back.total_lights, 2);
        assert_eq!(back.total_volumetric_usage, 1);

        let none = set.light_stats_by_layer(SortingLayerId(9));
        assert!(none.blend_styles_used.is_empty());
        assert_eq!(none.total_lights, 0);
    }

    #[test]
    fn blend_style_iteration_keeps_insertion_order_after_removal() {
        let mut set = LightSet::new();
        let a = set.add(global(1, &[BACK]).with_intensity(1.0));
        set.add(global(0, &[BACK]));
        set.add(global(1, &[BACK]).with_intensity(2.0));
        set.add(global(1, &[BACK]).with_intensity(3.0));
        assert!(set.remove(a).is_some());

        let intensities: Vec<f32> = set.lights_by_blend_style(1).map(|l| l.intensity).collect();
        assert_eq!(intensities, vec![2.0, 3.0]);
        // Restartable.
        assert_eq!(set.lights_by_blend_style(1).count(), 2);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn removed_handles_stay_dead() {
        let mut set = LightSet::new();
        let h = set.add(global(0, &[BACK]));
        set.remove(h);
        assert!(set.get(h).is_none());
        assert!(set.remove(h).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut set = LightSet::new();
        let h = set.add(global(0, &[BACK]));
        set.get_mut(h).unwrap().blend_style = 3;
        assert!(set.light_stats_by_layer(BACK).blend_styles_used.contains(3));
    }
}
