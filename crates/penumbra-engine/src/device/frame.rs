use crate::render::RenderTarget;

/// One acquired surface frame.
///
/// Holding it blocks acquisition of the next surface texture; submit promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Size of the acquired texture in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let t = &self.surface_texture.texture;
        (t.width(), t.height())
    }

    /// Camera color target over this frame's view and encoder.
    pub fn render_target(&mut self) -> RenderTarget<'_> {
        let (width, height) = self.size();
        RenderTarget::new(&mut self.encoder, &self.view, width, height)
    }
}
