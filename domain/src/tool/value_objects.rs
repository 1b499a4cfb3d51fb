//! Tool domain value objects: the result side of a tool call
//!
//! A handler never fails outright: backend errors, malformed input and
//! missing configuration are all reported as a [`CallToolResult`] with
//! `is_error` set and a human-readable message in its content.

use serde::{Deserialize, Serialize};

/// One block of tool output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        ToolContent::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolContent::Text { text } => Some(text),
        }
    }
}

/// Result payload returned by every tool handler.
///
/// Wire shape: `{"content": [{"type": "text", "text": "..."}], "isError": true}`.
/// `isError` is omitted when false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<ToolContent>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl CallToolResult {
    /// Successful result with a single text block
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            is_error: false,
        }
    }

    /// Failed result carrying a human-readable message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(message)],
            is_error: true,
        }
    }

    pub fn with_content(mut self, content: ToolContent) -> Self {
        self.content.push(content);
        self
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// All text blocks joined by newlines
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| c.as_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
