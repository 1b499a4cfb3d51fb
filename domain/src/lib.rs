//! Domain layer for toolbridge
//!
//! This crate contains the core types shared by every tool provider and
//! front end. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! ## Tool
//!
//! A tool is a named, schema-described operation. Providers expose tools
//! through a [`ToolHandler`]; callers see only [`ToolDescriptor`]s and
//! [`CallToolResult`]s regardless of where the tool runs.
//!
//! ## Intent
//!
//! A music query is decomposed into typed search [`Intent`]s by a
//! classification model. Parsing of model output lives here so it can be
//! tested without a model.

pub mod intent;
pub mod tool;

// Re-export commonly used types
pub use intent::{
    Classification, ClassificationParseError, Intent, MusicItem, RawIntent, SearchType,
    classify_output,
};
pub use tool::{
    arguments::{IntentArgs, NoArgs, QueryArgs, WeatherArgs},
    entities::{InputSchema, PropertyKind, SchemaProperty, ToolArguments, ToolCall, ToolDescriptor},
    handler::{ToolHandler, handler_fn, parse_arguments, to_arguments, typed_handler},
    validation::{SchemaError, SchemaValidator, ToolValidator, ValidationError},
    value_objects::{CallToolResult, ToolContent},
};
