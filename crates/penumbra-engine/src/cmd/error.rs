use thiserror::Error;

use super::TargetId;

/// Failure while executing a command stream.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("temporary target {0:?} is not allocated")]
    UnknownTarget(TargetId),

    #[error("temporary target {0:?} is already allocated")]
    TargetAlreadyAllocated(TargetId),

    #[error("draw issued before any render target was set")]
    NoRenderTarget,

    #[error("end of sample '{0}' does not match the innermost open sample")]
    UnbalancedSample(String),

    #[error("shader '{shader}' has no pass {pass}")]
    MissingShaderPass { shader: String, pass: u32 },

    /// A sampled texture was bound before the backend uploaded it.
    #[error("texture was not uploaded before use")]
    TextureNotUploaded,
}
