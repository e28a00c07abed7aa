/// Device and surface options for the compositor window.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Light values are linear; an sRGB surface encodes them on write.
    pub prefer_srgb: bool,
    pub power_preference: wgpu::PowerPreference,
    pub present_mode: wgpu::PresentMode,
    /// Ignored unless the surface supports it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
    /// Hint only.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
