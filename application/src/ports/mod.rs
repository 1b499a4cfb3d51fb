//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod language_model;
pub mod music_search;
pub mod readiness_probe;
pub mod tool_catalog;
