//! Application layer for toolbridge
//!
//! This crate contains use cases and port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    language_model::{LanguageModel, ModelError},
    music_search::{AccessToken, BackendError, MusicSearchPort},
    readiness_probe::{ProbeError, ReadinessProbe},
    tool_catalog::{CatalogError, ToolCatalogPort},
};
pub use use_cases::readiness::{ReadinessError, ReadinessGate};
pub use use_cases::search_music::{
    CLASSIFY_TOOL, MAX_INTENTS, SearchMusicError, SearchMusicOutput, SearchMusicUseCase,
};
