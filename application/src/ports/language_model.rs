//! Language Model port
//!
//! The model is a black box: a prompt goes in, text comes out.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while generating text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Model host unreachable: {0}")]
    Unreachable(String),

    #[error("Model host returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed model response: {0}")]
    Decode(String),
}

/// Port for text generation
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for a single user prompt
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}
