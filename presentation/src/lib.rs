//! Presentation layer for toolbridge
//!
//! This crate contains the CLI definition, the interactive REPL, the HTTP
//! façade, console formatting and progress indicators. Every front end
//! talks to the tool catalog through
//! [`ToolCatalogPort`](toolbridge_application::ToolCatalogPort).

pub mod chat;
pub mod cli;
pub mod config;
pub mod http;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ReplCommand, ToolRepl, parse_json_arguments};
pub use cli::commands::Cli;
pub use config::{HttpConfig, ReplConfig};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{CallProgress, with_progress};
