//! Music Search port
//!
//! Defines the interface to the music catalog used by the query pipeline.

use async_trait::async_trait;
use thiserror::Error;
use toolbridge_domain::intent::{Intent, MusicItem};

/// Bearer token for catalog requests
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// A failed outbound call to a third-party API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Whether the backend could not be reached at all (as opposed to
    /// answering with an error)
    pub fn is_unreachable(&self) -> bool {
        matches!(self, BackendError::Unreachable(_) | BackendError::NotConfigured(_))
    }
}

/// Port for music catalog search
#[async_trait]
pub trait MusicSearchPort: Send + Sync {
    /// Obtain a bearer token for subsequent searches
    async fn authorize(&self) -> Result<AccessToken, BackendError>;

    /// Search the catalog for one intent
    async fn search(
        &self,
        token: &AccessToken,
        intent: &Intent,
    ) -> Result<Vec<MusicItem>, BackendError>;
}
