use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::Mat4;

use crate::coords::{ColorRgba, Vec2};
use crate::light::{LightMesh, Texture2D};
use crate::paint::Color;
use crate::scene::{DrawingSettings, FilteringSettings};

use super::Material;

/// Handle of a transient render target.
///
/// Ids are process-unique and never zero, so an unassigned handle is
/// represented as `Option<TargetId>::None` rather than a sentinel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TargetId(NonZeroU32);

impl TargetId {
    pub fn allocate() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        let raw = NEXT.fetch_add(1, Ordering::Relaxed);
        // Wrapping past u32::MAX would take four billion allocations.
        TargetId(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MIN))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TargetFormat {
    Rgba8Unorm,
}

/// Shape of a transient render target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TargetDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: TargetFormat,
    pub mip_maps: bool,
    pub depth_bits: u8,
    pub msaa_samples: u32,
}

impl TargetDescriptor {
    /// Single-sample 2D color target with no mips and no depth.
    pub fn color(width: u32, height: u32, format: TargetFormat) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            format,
            mip_maps: false,
            depth_bits: 0,
            msaa_samples: 1,
        }
    }
}

/// Where draws land.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RenderTargetRef {
    /// The camera's final color attachment.
    CameraColor,
    Temporary(TargetId),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LoadAction {
    Load,
    /// Previous contents may be discarded.
    DontCare,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StoreAction {
    Store,
    DontCare,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GlobalColor {
    LightColor,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GlobalFloat {
    FalloffIntensity,
    FalloffDistance,
    VolumeOpacity,
    HdrEmulationScale,
    InverseHdrEmulationScale,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GlobalVector {
    FalloffOffset,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GlobalTexture {
    /// Unlit scene color the light shaders modulate.
    BaseColor,
    FalloffLookup,
    Cookie,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GlobalMatrix {
    ViewProjection,
}

/// Texture bound to a global slot.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureRef {
    Target(TargetId),
    /// Backend-baked falloff curve lookup.
    FalloffLookup,
    /// Built-in opaque white 1x1 texture.
    White,
    Image(Texture2D),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderKeyword {
    /// Sample `GlobalTexture::Cookie` in the shape-light shader.
    SpriteLight,
    /// Blend shape lights additively onto the target.
    UseAdditiveBlending,
}

/// Mesh drawn by `DrawMesh`.
#[derive(Debug, Clone)]
pub enum MeshRef {
    /// Screen-covering quad in clip space; ignores transforms.
    Fullscreen,
    Light(Arc<LightMesh>),
}

impl PartialEq for MeshRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MeshRef::Fullscreen, MeshRef::Fullscreen) => true,
            (MeshRef::Light(a), MeshRef::Light(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// One recorded operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    BeginSample(String),
    EndSample(String),
    GetTemporaryTarget { id: TargetId, descriptor: TargetDescriptor },
    ReleaseTemporaryTarget(TargetId),
    SetRenderTarget {
        target: RenderTargetRef,
        load: LoadAction,
        store: StoreAction,
        /// Clears to this color after binding.
        clear: Option<Color>,
    },
    /// Draws the culled drawables selected by `filter`, ordered by `drawing`.
    DrawRenderers { filter: FilteringSettings, drawing: DrawingSettings },
    SetGlobalColor(GlobalColor, ColorRgba),
    SetGlobalFloat(GlobalFloat, f32),
    SetGlobalVector(GlobalVector, Vec2),
    SetGlobalTexture(GlobalTexture, TextureRef),
    SetGlobalMatrix(GlobalMatrix, Mat4),
    EnableKeyword(ShaderKeyword),
    DisableKeyword(ShaderKeyword),
    DrawMesh { mesh: MeshRef, transform: Mat4, material: Material, pass: u32 },
}
