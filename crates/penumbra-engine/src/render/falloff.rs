//! Falloff lookup baked on the CPU.
//!
//! Layout: `FALLOFF_LUT_WIDTH` x `FALLOFF_LUT_HEIGHT` texels of `R8Unorm`.
//! The x axis is the normalized position across the falloff ring (0 at the lit
//! core, 1 at the outer edge); the y axis is the light's falloff intensity.
//! Each row holds `(1 - x) ^ exponent(y)`, so values never increase with x and
//! higher rows fall off faster.

pub const FALLOFF_LUT_WIDTH: u32 = 256;
pub const FALLOFF_LUT_HEIGHT: u32 = 64;

const MIN_EXPONENT: f32 = 0.25;
const MAX_EXPONENT: f32 = 4.0;

/// Curve exponent for a falloff intensity in `0..=1`.
#[inline]
pub fn falloff_exponent(intensity: f32) -> f32 {
    let t = intensity.clamp(0.0, 1.0);
    MIN_EXPONENT + (MAX_EXPONENT - MIN_EXPONENT) * t
}

/// Row-major texels, one byte each.
pub fn bake_falloff_lookup() -> Vec<u8> {
    let (w, h) = (FALLOFF_LUT_WIDTH as usize, FALLOFF_LUT_HEIGHT as usize);
    let mut texels = Vec::with_capacity(w * h);
    for y in 0..h {
        let exponent = falloff_exponent(y as f32 / (h - 1) as f32);
        for x in 0..w {
            let d = x as f32 / (w - 1) as f32;
            let v = (1.0 - d).powf(exponent);
            texels.push((v * 255.0).round().clamp(0.0, 255.0) as u8);
        }
    }
    texels
}

pub(super) fn upload_falloff_lookup(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> (wgpu::Texture, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width: FALLOFF_LUT_WIDTH,
        height: FALLOFF_LUT_HEIGHT,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("penumbra falloff lookup"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::R8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &bake_falloff_lookup(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(FALLOFF_LUT_WIDTH),
            rows_per_image: Some(FALLOFF_LUT_HEIGHT),
        },
        size,
    );
    log::debug!("baked falloff lookup {FALLOFF_LUT_WIDTH}x{FALLOFF_LUT_HEIGHT}");
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(texels: &[u8], y: usize) -> &[u8] {
        let w = FALLOFF_LUT_WIDTH as usize;
        &texels[y * w..(y + 1) * w]
    }

    #[test]
    fn sized_as_documented() {
        let lut = bake_falloff_lookup();
        assert_eq!(lut.len(), (FALLOFF_LUT_WIDTH * FALLOFF_LUT_HEIGHT) as usize);
    }

    #[test]
    fn every_row_is_monotonic_from_core_to_edge() {
        let lut = bake_falloff_lookup();
        for y in 0..FALLOFF_LUT_HEIGHT as usize {
            let r = row(&lut, y);
            assert_eq!(r[0], 255, "row {y} core");
            assert_eq!(*r.last().unwrap(), 0, "row {y} edge");
            assert!(r.windows(2).all(|p| p[0] >= p[1]), "row {y} increases");
        }
    }

    #[test]
    fn higher_intensity_falls_off_faster() {
        let lut = bake_falloff_lookup();
        let mid = FALLOFF_LUT_WIDTH as usize / 2;
        let soft = row(&lut, 0)[mid];
        let hard = row(&lut, FALLOFF_LUT_HEIGHT as usize - 1)[mid];
        assert!(soft > hard);
    }

    #[test]
    fn exponent_clamps_intensity() {
        assert_eq!(falloff_exponent(-1.0), MIN_EXPONENT);
        assert_eq!(falloff_exponent(2.0), MAX_EXPONENT);
    }
}
