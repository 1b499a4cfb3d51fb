//! REPL input parsing

use serde_json::Value;
use thiserror::Error;
use toolbridge_domain::tool::{QueryArgs, ToolArguments, to_arguments};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplCommandError {
    #[error("Usage: /call <name> [json]")]
    MissingToolName,

    #[error("Arguments must be a JSON object: {0}")]
    InvalidArguments(String),

    #[error("Unknown command: {0} (try /help)")]
    UnknownCommand(String),
}

/// One parsed line of REPL input
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Tools,
    Call {
        name: String,
        arguments: ToolArguments,
    },
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse one input line.
    ///
    /// Blank input yields `Ok(None)`. Plain text becomes a call to
    /// `default_tool` with `{query: text}`.
    pub fn parse(line: &str, default_tool: &str) -> Result<Option<Self>, ReplCommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if !line.starts_with('/') {
            return Ok(Some(ReplCommand::Call {
                name: default_tool.to_string(),
                arguments: to_arguments(&QueryArgs::new(line)),
            }));
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        let parsed = match command {
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/tools" | "/t" => ReplCommand::Tools,
            "/call" => {
                let (name, raw_args) = match rest.split_once(char::is_whitespace) {
                    Some((name, raw_args)) => (name, raw_args.trim()),
                    None => (rest, ""),
                };
                if name.is_empty() {
                    return Err(ReplCommandError::MissingToolName);
                }
                ReplCommand::Call {
                    name: name.to_string(),
                    arguments: parse_json_arguments(raw_args)?,
                }
            }
            other => return Err(ReplCommandError::UnknownCommand(other.to_string())),
        };
        Ok(Some(parsed))
    }
}

/// Parse a JSON object of tool arguments; blank input is `{}`
pub fn parse_json_arguments(raw: &str) -> Result<ToolArguments, ReplCommandError> {
    if raw.trim().is_empty() {
        return Ok(ToolArguments::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ReplCommandError::InvalidArguments(format!(
            "got {}",
            kind_name(&other)
        ))),
        Err(e) => Err(ReplCommandError::InvalidArguments(e.to_string())),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
