//! Readiness Probe port

use async_trait::async_trait;
use thiserror::Error;

/// A probe attempt that could not be completed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ProbeError(pub String);

/// Port for checking whether an external dependency is up
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Human-readable name of the probed dependency, used in errors
    fn dependency(&self) -> String;

    /// `Ok(true)` when ready. Both `Ok(false)` and `Err` mean "not yet".
    async fn probe(&self) -> Result<bool, ProbeError>;
}
