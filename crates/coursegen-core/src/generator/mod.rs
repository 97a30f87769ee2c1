//! Generation service boundary.
//!
//! One call per task; latency varies by orders of magnitude and every call is
//! independently fallible. The engine never assumes partial success: a task
//! either yields an artifact id or an error, nothing in between.

mod http;

pub use http::HttpGenerator;

use async_trait::async_trait;
use thiserror::Error;

use crate::task::TaskSpec;

/// Per-task generation failure. Never propagates past the task boundary: the
/// scheduler records the message on the failed task and moves on.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// Could not reach the generation service or read its response.
    #[error("generation request failed: {0}")]
    Transport(String),
    /// The service answered but refused or failed the request.
    #[error("generation of {title:?} rejected: {message}")]
    Rejected { title: String, message: String },
}

/// The external component invoked once per task to produce a content artifact.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate one artifact and return its identifier.
    async fn generate(&self, spec: &TaskSpec) -> Result<String, GenerationError>;
}
