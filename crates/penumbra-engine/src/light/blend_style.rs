/// Number of blend styles a `BlendStyleMask` can address.
pub const MAX_BLEND_STYLES: usize = 32;

/// A named bucket of lights sharing composition settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LightBlendStyle {
    pub name: String,
}

impl LightBlendStyle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Profiling scope label for this style.
    pub fn sample_name(&self) -> String {
        format!("Blend Style - {}", self.name)
    }
}

/// Bitmask of blend-style indices. Bit `i` is style `i`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct BlendStyleMask(pub u32);

impl BlendStyleMask {
    pub const EMPTY: BlendStyleMask = BlendStyleMask(0);

    #[inline]
    pub fn contains(self, style: usize) -> bool {
        style < MAX_BLEND_STYLES && self.0 & (1u32 << style) != 0
    }

    /// Sets the bit for `style`. Indices past the mask width are ignored.
    #[inline]
    pub fn insert(&mut self, style: usize) {
        if style < MAX_BLEND_STYLES {
            self.0 |= 1u32 << style;
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set style indices, ascending.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_BLEND_STYLES).filter(move |&i| self.contains(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_iterate_ascending() {
        let mut m = BlendStyleMask::EMPTY;
        m.insert(3);
        m.insert(0);
        m.insert(31);
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![0, 3, 31]);
    }

    #[test]
    fn out_of_range_style_is_ignored() {
        let mut m = BlendStyleMask::EMPTY;
        m.insert(32);
        assert!(m.is_empty());
        assert!(!m.contains(40));
    }

    #[test]
    fn sample_name_includes_style_name() {
        assert_eq!(LightBlendStyle::new("Rim").sample_name(), "Blend Style - Rim");
    }
}
