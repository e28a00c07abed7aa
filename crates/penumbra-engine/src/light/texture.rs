use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique texture identity. Backends cache GPU uploads by it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(u64);

impl TextureId {
    fn allocate() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        TextureId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Immutable RGBA8 image (straight alpha, sRGB-encoded), shared by handle.
///
/// Clones share pixels and identity.
#[derive(Debug, Clone)]
pub struct Texture2D {
    id: TextureId,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Texture2D {
    /// Wraps tightly packed RGBA8 rows. No validation happens here; see
    /// [`Texture2D::is_valid`].
    pub fn from_rgba8(width: u32, height: u32, pixels: impl Into<Arc<[u8]>>) -> Self {
        Self { id: TextureId::allocate(), width, height, pixels: pixels.into() }
    }

    /// Single-color 1x1 texture.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self::from_rgba8(1, 1, rgba.to_vec())
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Non-zero size and exactly `width * height * 4` bytes.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() as u64 == self.width as u64 * self.height as u64 * 4
    }
}

impl PartialEq for Texture2D {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Texture2D {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_checks_size_and_length() {
        assert!(Texture2D::solid([255; 4]).is_valid());
        assert!(!Texture2D::from_rgba8(0, 0, Vec::new()).is_valid());
        assert!(!Texture2D::from_rgba8(2, 2, vec![0; 15]).is_valid());
    }

    #[test]
    fn clones_share_identity() {
        let a = Texture2D::solid([0; 4]);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Texture2D::solid([0; 4]));
    }
}
