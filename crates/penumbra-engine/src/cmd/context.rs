use std::collections::HashSet;

use super::{BackendError, CommandBuffer, RenderCommand, RenderTargetRef, TargetId, TextureRef};

/// Executes recorded command buffers.
///
/// Execution may be deferred further by the implementation (the wgpu backend
/// encodes into a frame encoder that is submitted later), but commands are
/// always applied in order.
pub trait RenderContext {
    fn execute_command_buffer(&mut self, cmd: &CommandBuffer) -> Result<(), BackendError>;
}

/// Device-free context that validates and keeps every executed command.
///
/// Validation mirrors what a GPU backend would reject: double allocation or
/// unknown temporary targets, draws without a bound target, unbalanced
/// profiling samples and draws of missing shader passes.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    batches: Vec<Vec<RenderCommand>>,
    live_targets: HashSet<TargetId>,
    bound: Option<RenderTargetRef>,
    open_samples: Vec<String>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per `execute_command_buffer` call.
    pub fn batches(&self) -> &[Vec<RenderCommand>] {
        &self.batches
    }

    /// All executed commands, in order.
    pub fn commands(&self) -> impl Iterator<Item = &RenderCommand> + '_ {
        self.batches.iter().flatten()
    }

    /// Returns and forgets the executed commands. Validation state is kept.
    pub fn take(&mut self) -> Vec<RenderCommand> {
        self.batches.drain(..).flatten().collect()
    }

    /// Temporary targets allocated and not yet released.
    pub fn live_targets(&self) -> usize {
        self.live_targets.len()
    }

    pub fn open_samples(&self) -> &[String] {
        &self.open_samples
    }

    fn check_target(&self, id: TargetId) -> Result<(), BackendError> {
        if self.live_targets.contains(&id) {
            Ok(())
        } else {
            Err(BackendError::UnknownTarget(id))
        }
    }

    fn validate(&mut self, cmd: &RenderCommand) -> Result<(), BackendError> {
        match cmd {
            RenderCommand::BeginSample(name) => self.open_samples.push(name.clone()),
            RenderCommand::EndSample(name) => {
                if self.open_samples.last() != Some(name) {
                    return Err(BackendError::UnbalancedSample(name.clone()));
                }
                self.open_samples.pop();
            }
            RenderCommand::GetTemporaryTarget { id, .. } => {
                if !self.live_targets.insert(*id) {
                    return Err(BackendError::TargetAlreadyAllocated(*id));
                }
            }
            RenderCommand::ReleaseTemporaryTarget(id) => {
                if !self.live_targets.remove(id) {
                    return Err(BackendError::UnknownTarget(*id));
                }
                if self.bound == Some(RenderTargetRef::Temporary(*id)) {
                    self.bound = None;
                }
            }
            RenderCommand::SetRenderTarget { target, .. } => {
                if let RenderTargetRef::Temporary(id) = target {
                    self.check_target(*id)?;
                }
                self.bound = Some(*target);
            }
            RenderCommand::SetGlobalTexture(_, TextureRef::Target(id)) => self.check_target(*id)?,
            RenderCommand::DrawRenderers { .. } => {
                if self.bound.is_none() {
                    return Err(BackendError::NoRenderTarget);
                }
            }
            RenderCommand::DrawMesh { material, pass, .. } => {
                if self.bound.is_none() {
                    return Err(BackendError::NoRenderTarget);
                }
                if material.shader().pass(*pass).is_none() {
                    return Err(BackendError::MissingShaderPass {
                        shader: material.shader().name.to_string(),
                        pass: *pass,
                    });
                }
            }
            RenderCommand::SetGlobalTexture(..)
            | RenderCommand::SetGlobalColor(..)
            | RenderCommand::SetGlobalFloat(..)
            | RenderCommand::SetGlobalVector(..)
            | RenderCommand::SetGlobalMatrix(..)
            | RenderCommand::EnableKeyword(_)
            | RenderCommand::DisableKeyword(_) => {}
        }
        Ok(())
    }
}

impl RenderContext for CommandRecorder {
    fn execute_command_buffer(&mut self, cmd: &CommandBuffer) -> Result<(), BackendError> {
        for c in cmd.commands() {
            self.validate(c)?;
        }
        self.batches.push(cmd.commands().to_vec());
        Ok(())
    }
}
