use thiserror::Error;

use crate::cmd::BackendError;
use crate::light::MAX_BLEND_STYLES;

/// Errors surfaced by the deferred shading pass.
#[derive(Debug, Error)]
pub enum Deferred2DError {
    /// Renderer data lacks a required shader reference.
    #[error("renderer data has no {0} shader")]
    MissingShader(&'static str),

    #[error("{count} light blend styles configured; at most {MAX_BLEND_STYLES} are addressable")]
    TooManyBlendStyles { count: usize },

    #[error("command execution failed")]
    Backend(#[from] BackendError),
}
