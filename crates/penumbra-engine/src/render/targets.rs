use std::collections::HashMap;

use crate::cmd::{BackendError, TargetDescriptor, TargetFormat, TargetId};

const MAX_FREE_TARGETS: usize = 4;

struct PooledTarget {
    descriptor: TargetDescriptor,
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Transient render targets, recycled across frames by descriptor.
#[derive(Default)]
pub(super) struct TargetPool {
    live: HashMap<TargetId, PooledTarget>,
    free: Vec<PooledTarget>,
}

pub(super) fn texture_format(format: TargetFormat) -> wgpu::TextureFormat {
    match format {
        TargetFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
    }
}

impl TargetPool {
    pub fn acquire(
        &mut self,
        device: &wgpu::Device,
        id: TargetId,
        descriptor: TargetDescriptor,
    ) -> Result<(), BackendError> {
        if self.live.contains_key(&id) {
            return Err(BackendError::TargetAlreadyAllocated(id));
        }
        let target = match self.free.iter().position(|t| t.descriptor == descriptor) {
            Some(i) => self.free.swap_remove(i),
            None => Self::create(device, descriptor),
        };
        self.live.insert(id, target);
        Ok(())
    }

    pub fn release(&mut self, id: TargetId) -> Result<(), BackendError> {
        let target = self.live.remove(&id).ok_or(BackendError::UnknownTarget(id))?;
        self.free.push(target);
        Ok(())
    }

    pub fn view(&self, id: TargetId) -> Result<&wgpu::TextureView, BackendError> {
        self.live.get(&id).map(|t| &t.view).ok_or(BackendError::UnknownTarget(id))
    }

    pub fn format(&self, id: TargetId) -> Result<wgpu::TextureFormat, BackendError> {
        self.live
            .get(&id)
            .map(|t| texture_format(t.descriptor.format))
            .ok_or(BackendError::UnknownTarget(id))
    }

    /// Returns targets still live at the end of a frame to the free list.
    pub fn reclaim_live(&mut self) -> usize {
        let count = self.live.len();
        self.free.extend(self.live.drain().map(|(_, target)| target));
        count
    }

    /// Keeps only the most recently released free targets.
    pub fn trim(&mut self) {
        if self.free.len() > MAX_FREE_TARGETS {
            let excess = self.free.len() - MAX_FREE_TARGETS;
            self.free.drain(..excess);
        }
    }

    fn create(device: &wgpu::Device, descriptor: TargetDescriptor) -> PooledTarget {
        log::debug!(
            "allocating transient target {}x{} {:?}",
            descriptor.width,
            descriptor.height,
            descriptor.format
        );
        let mip_level_count = if descriptor.mip_maps {
            32 - descriptor.width.max(descriptor.height).max(1).leading_zeros()
        } else {
            1
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("penumbra transient target"),
            size: wgpu::Extent3d {
                width: descriptor.width.max(1),
                height: descriptor.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: descriptor.msaa_samples.max(1),
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(descriptor.format),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        PooledTarget { descriptor, _texture: texture, view }
    }
}
