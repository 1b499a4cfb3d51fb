//! Tool domain module
//!
//! Defines what a tool *is*, independently of which provider implements it
//! or which transport carries the call.
//!
//! ```text
//! ┌────────────────┐    ┌──────────────┐    ┌────────────────┐
//! │ ToolDescriptor │───▶│ ToolCall     │───▶│ CallToolResult │
//! │ + InputSchema  │    │ (name, args) │    │ (content, err) │
//! └────────────────┘    └──────┬───────┘    └────────────────┘
//!                              │
//!                    SchemaValidator, then
//!                    ToolHandler::call(args)
//! ```
//!
//! # Key Types
//!
//! - [`ToolDescriptor`]: name, description and [`InputSchema`] of a tool
//! - [`ToolHandler`]: the asynchronous body of a tool
//! - [`CallToolResult`]: text content plus an `is_error` flag; handlers
//!   report every failure this way instead of returning `Err`
//! - [`SchemaValidator`]: structural argument check run before a handler
//! - [`arguments`]: typed argument structs decoded at the handler boundary

pub mod arguments;
pub mod entities;
pub mod handler;
pub mod validation;
pub mod value_objects;

pub use arguments::{IntentArgs, NoArgs, QueryArgs, WeatherArgs};
pub use entities::{InputSchema, PropertyKind, SchemaProperty, ToolArguments, ToolCall, ToolDescriptor};
pub use handler::{FnHandler, ToolHandler, TypedHandler, handler_fn, parse_arguments, to_arguments, typed_handler};
pub use validation::{SchemaError, SchemaValidator, ToolValidator, ValidationError};
pub use value_objects::{CallToolResult, ToolContent};
