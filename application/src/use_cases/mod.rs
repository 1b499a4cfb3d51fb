//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod readiness;
pub mod search_music;
