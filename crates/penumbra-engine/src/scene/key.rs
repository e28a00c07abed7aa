use core::cmp::Ordering;

use super::SortingCriteria;

/// Sort key for drawables.
///
/// Ordering rules (both criteria):
/// 1) `sort_value` ascending (sorting layer, back to front)
/// 2) `sorting_order` ascending (order within the layer)
/// 3) `render_queue` ascending
/// 4) `depth`: descending for transparent (farthest first), ascending for opaque
/// 5) `material_id` ascending (groups state changes)
/// 6) `order` ascending (insertion order, keeps sorting stable)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SortKey {
    pub sort_value: i16,
    pub sorting_order: i16,
    pub render_queue: u32,
    pub depth: f32,
    pub material_id: u32,
    pub order: u32,
}

impl SortKey {
    pub fn compare(&self, other: &Self, criteria: SortingCriteria) -> Ordering {
        let depth = match criteria {
            SortingCriteria::CommonTransparent => other.depth.total_cmp(&self.depth),
            SortingCriteria::CommonOpaque => self.depth.total_cmp(&other.depth),
        };

        self.sort_value
            .cmp(&other.sort_value)
            .then(self.sorting_order.cmp(&other.sorting_order))
            .then(self.render_queue.cmp(&other.render_queue))
            .then(depth)
            .then(self.material_id.cmp(&other.material_id))
            .then(self.order.cmp(&other.order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(sort_value: i16, depth: f32, order: u32) -> SortKey {
        SortKey { sort_value, sorting_order: 0, render_queue: 3000, depth, material_id: 0, order }
    }

    #[test]
    fn sort_value_dominates_depth() {
        let back = key(-5, 0.0, 1);
        let front = key(5, 100.0, 0);
        assert_eq!(back.compare(&front, SortingCriteria::CommonTransparent), Ordering::Less);
    }

    #[test]
    fn transparent_draws_far_first() {
        let far = key(0, 10.0, 1);
        let near = key(0, 1.0, 0);
        assert_eq!(far.compare(&near, SortingCriteria::CommonTransparent), Ordering::Less);
        assert_eq!(far.compare(&near, SortingCriteria::CommonOpaque), Ordering::Greater);
    }

    #[test]
    fn insertion_order_breaks_full_ties() {
        let a = key(0, 0.0, 3);
        let b = key(0, 0.0, 4);
        assert_eq!(a.compare(&b, SortingCriteria::CommonTransparent), Ordering::Less);
    }
}
