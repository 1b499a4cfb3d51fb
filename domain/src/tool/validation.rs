//! Boundary validation of tool arguments
//!
//! Arguments are checked against the tool's [`InputSchema`] before any
//! handler runs, so handlers only ever see structurally valid input.

use thiserror::Error;

use super::entities::{InputSchema, ToolArguments};

/// Argument validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required argument '{argument}' for tool '{tool}'")]
    MissingArgument { tool: String, argument: String },

    #[error("unknown argument '{argument}' for tool '{tool}'")]
    UnknownArgument { tool: String, argument: String },

    #[error("argument '{argument}' for tool '{tool}' must be of type {expected}")]
    WrongType {
        tool: String,
        argument: String,
        expected: String,
    },

    #[error("invalid arguments: {0}")]
    Malformed(String),
}

/// A JSON Schema document that cannot be represented as an [`InputSchema`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("input schema must be a JSON object")]
    NotAnObject,

    #[error("unsupported input schema root type '{0}'")]
    UnsupportedRootType(String),

    #[error("property '{property}' has unsupported type '{kind}'")]
    UnsupportedPropertyType { property: String, kind: String },
}

/// Validator for tool arguments
pub trait ToolValidator {
    fn validate(
        &self,
        tool: &str,
        schema: &InputSchema,
        arguments: &ToolArguments,
    ) -> Result<(), ValidationError>;
}

/// Structural validator: required presence, no unknown keys, JSON types.
///
/// `null` counts as absent for optional arguments.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator;

impl ToolValidator for SchemaValidator {
    fn validate(
        &self,
        tool: &str,
        schema: &InputSchema,
        arguments: &ToolArguments,
    ) -> Result<(), ValidationError> {
        for property in schema.required() {
            match arguments.get(&property.name) {
                None | Some(serde_json::Value::Null) => {
                    return Err(ValidationError::MissingArgument {
                        tool: tool.to_string(),
                        argument: property.name.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        for (name, value) in arguments {
            let Some(property) = schema.property(name) else {
                return Err(ValidationError::UnknownArgument {
                    tool: tool.to_string(),
                    argument: name.clone(),
                });
            };
            if value.is_null() && !property.required {
                continue;
            }
            if !property.kind.accepts(value) {
                return Err(ValidationError::WrongType {
                    tool: tool.to_string(),
                    argument: name.clone(),
                    expected: property.kind.to_string(),
                });
            }
        }

        Ok(())
    }
}
