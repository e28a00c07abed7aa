use glam::Mat4;

use crate::coords::{ColorRgba, Vec2};
use crate::paint::Color;
use crate::scene::{DrawingSettings, FilteringSettings};

use super::{
    GlobalColor, GlobalFloat, GlobalMatrix, GlobalTexture, GlobalVector, LoadAction, Material,
    MeshRef, RenderCommand, RenderTargetRef, ShaderKeyword, StoreAction, TargetDescriptor,
    TargetId, TextureRef,
};

/// Ordered, named list of recorded commands.
///
/// Recording is O(1) per command. `clear()` keeps capacity, so a buffer owned
/// by a pass stops allocating after the first few frames.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    name: String,
    commands: Vec<RenderCommand>,
}

impl CommandBuffer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), commands: Vec::new() }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drops recorded commands, keeping capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    #[inline]
    pub fn push(&mut self, cmd: RenderCommand) {
        self.commands.push(cmd);
    }

    pub fn begin_sample(&mut self, name: impl Into<String>) {
        self.push(RenderCommand::BeginSample(name.into()));
    }

    pub fn end_sample(&mut self, name: impl Into<String>) {
        self.push(RenderCommand::EndSample(name.into()));
    }

    pub fn get_temporary_target(&mut self, id: TargetId, descriptor: TargetDescriptor) {
        self.push(RenderCommand::GetTemporaryTarget { id, descriptor });
    }

    pub fn release_temporary_target(&mut self, id: TargetId) {
        self.push(RenderCommand::ReleaseTemporaryTarget(id));
    }

    pub fn set_render_target(
        &mut self,
        target: RenderTargetRef,
        load: LoadAction,
        store: StoreAction,
        clear: Option<Color>,
    ) {
        self.push(RenderCommand::SetRenderTarget { target, load, store, clear });
    }

    pub fn draw_renderers(&mut self, filter: FilteringSettings, drawing: DrawingSettings) {
        self.push(RenderCommand::DrawRenderers { filter, drawing });
    }

    pub fn set_global_color(&mut self, slot: GlobalColor, value: ColorRgba) {
        self.push(RenderCommand::SetGlobalColor(slot, value));
    }

    pub fn set_global_float(&mut self, slot: GlobalFloat, value: f32) {
        self.push(RenderCommand::SetGlobalFloat(slot, value));
    }

    pub fn set_global_vector(&mut self, slot: GlobalVector, value: Vec2) {
        self.push(RenderCommand::SetGlobalVector(slot, value));
    }

    pub fn set_global_texture(&mut self, slot: GlobalTexture, texture: TextureRef) {
        self.push(RenderCommand::SetGlobalTexture(slot, texture));
    }

    pub fn set_global_matrix(&mut self, slot: GlobalMatrix, value: Mat4) {
        self.push(RenderCommand::SetGlobalMatrix(slot, value));
    }

    pub fn enable_keyword(&mut self, keyword: ShaderKeyword) {
        self.push(RenderCommand::EnableKeyword(keyword));
    }

    pub fn disable_keyword(&mut self, keyword: ShaderKeyword) {
        self.push(RenderCommand::DisableKeyword(keyword));
    }

    pub fn draw_mesh(&mut self, mesh: MeshRef, transform: Mat4, material: &Material, pass: u32) {
        self.push(RenderCommand::DrawMesh { mesh, transform, material: material.clone(), pass });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_keeps_name_and_drops_commands() {
        let mut cmd = CommandBuffer::new("frame");
        cmd.begin_sample("a");
        cmd.end_sample("a");
        assert_eq!(cmd.len(), 2);

        cmd.clear();
        assert!(cmd.is_empty());
        assert_eq!(cmd.name(), "frame");
    }

    #[test]
    fn helpers_record_in_order() {
        let mut cmd = CommandBuffer::new("t");
        cmd.enable_keyword(ShaderKeyword::UseAdditiveBlending);
        cmd.set_global_float(GlobalFloat::FalloffDistance, 2.0);
        assert_eq!(
            cmd.commands(),
            &[
                RenderCommand::EnableKeyword(ShaderKeyword::UseAdditiveBlending),
                RenderCommand::SetGlobalFloat(GlobalFloat::FalloffDistance, 2.0),
            ]
        );
    }
}
