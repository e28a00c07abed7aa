use core::ops::Mul;

/// Linear straight-alpha RGBA color, used for light colors.
///
/// Light colors are not clamped: `intensity * color` may exceed 1.0 and the
/// backend relies on HDR emulation to store such values.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Scales every channel, alpha included.
impl Mul<f32> for ColorRgba {
    type Output = ColorRgba;
    #[inline]
    fn mul(self, rhs: f32) -> ColorRgba {
        ColorRgba::new(self.r * rhs, self.g * rhs, self.b * rhs, self.a * rhs)
    }
}

impl Mul<ColorRgba> for f32 {
    type Output = ColorRgba;
    #[inline]
    fn mul(self, rhs: ColorRgba) -> ColorRgba {
        rhs * self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_multiply_scales_alpha_too() {
        let c = 2.0 * ColorRgba::new(0.5, 0.25, 1.0, 1.0);
        assert_eq!(c, ColorRgba::new(1.0, 0.5, 2.0, 2.0));
    }

    #[test]
    fn zero_intensity_is_transparent_black() {
        assert_eq!(ColorRgba::white() * 0.0, ColorRgba::new(0.0, 0.0, 0.0, 0.0));
    }
}
