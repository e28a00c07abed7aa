use super::Vec2;

/// Axis-aligned rectangle in world units. `origin` is the minimum corner.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { origin: min, size: max - min }.normalized()
    }

    #[inline]
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self { origin: center - size * 0.5, size }.normalized()
    }

    /// Smallest rectangle enclosing every point. `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self::from_min_max(min, max))
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let (x, w) = if self.size.x < 0.0 {
            (self.origin.x + self.size.x, -self.size.x)
        } else {
            (self.origin.x, self.size.x)
        };
        let (y, h) = if self.size.y < 0.0 {
            (self.origin.y + self.size.y, -self.size.y)
        } else {
            (self.origin.y, self.size.y)
        };
        Rect::new(x, y, w, h)
    }

    /// Grows every edge outward by `amount` (shrinks for negative values).
    #[inline]
    pub fn expanded(self, amount: f32) -> Self {
        let r = self.normalized();
        Rect::new(
            r.origin.x - amount,
            r.origin.y - amount,
            r.size.x + 2.0 * amount,
            r.size.y + 2.0 * amount,
        )
    }

    #[inline]
    pub fn translated(self, by: Vec2) -> Self {
        Self { origin: self.origin + by, size: self.size }
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        let max = r.max();
        p.x >= r.origin.x && p.y >= r.origin.y && p.x < max.x && p.y < max.y
    }

    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();

        let lo = a.min().max(b.min());
        let hi = a.max().min(b.max());

        if hi.x - lo.x <= 0.0 || hi.y - lo.y <= 0.0 {
            None
        } else {
            Some(Rect::from_min_max(lo, hi))
        }
    }

    #[inline]
    pub fn overlaps(self, other: Rect) -> bool {
        self.intersect(other).is_some()
    }
}
