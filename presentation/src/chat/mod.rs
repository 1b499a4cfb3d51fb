//! Interactive REPL

pub mod command;
pub mod repl;

pub use command::{ReplCommand, ReplCommandError, parse_json_arguments};
pub use repl::{ReplOutcome, ToolRepl};
