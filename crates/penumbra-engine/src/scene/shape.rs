use crate::coords::Rect;
use crate::paint::Color;

/// Geometry payload of a drawable.
///
/// Extending: add a variant here and teach `render::geometry` to emit an
/// instance for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned filled rectangle.
    Rect { rect: Rect, color: Color },
    /// Filled ellipse inscribed in `bounds`.
    Ellipse { bounds: Rect, color: Color },
}

impl Shape {
    #[inline]
    pub fn rect(rect: Rect, color: Color) -> Self {
        Shape::Rect { rect, color }
    }

    #[inline]
    pub fn ellipse(bounds: Rect, color: Color) -> Self {
        Shape::Ellipse { bounds, color }
    }

    /// World-space bounds.
    #[inline]
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect { rect, .. } => rect.normalized(),
            Shape::Ellipse { bounds, .. } => bounds.normalized(),
        }
    }

    #[inline]
    pub fn color(&self) -> Color {
        match self {
            Shape::Rect { color, .. } | Shape::Ellipse { color, .. } => *color,
        }
    }
}
