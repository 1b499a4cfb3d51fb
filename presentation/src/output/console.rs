//! Console output formatter for tool catalogs and call results

use colored::Colorize;
use toolbridge_domain::tool::{CallToolResult, ToolDescriptor};

/// Formats tool listings and results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One line per tool plus its arguments
    pub fn format_tools(tools: &[ToolDescriptor]) -> String {
        if tools.is_empty() {
            return format!("{}\n", "No tools available.".yellow());
        }

        let mut output = Self::header(&format!("Tools ({})", tools.len()));
        output.push('\n');
        for tool in tools {
            output.push_str(&format!(
                "  {} - {}\n",
                tool.name.green().bold(),
                tool.description
            ));
            for property in tool.input_schema.properties() {
                let marker = if property.required { "*" } else { " " };
                output.push_str(&format!(
                    "      {}{} ({}) {}\n",
                    property.name.cyan(),
                    marker,
                    property.kind,
                    property.description.dimmed()
                ));
            }
        }
        output
    }

    /// Text content of a call result; error results are marked
    pub fn format_result(result: &CallToolResult) -> String {
        let text = result.text_content();
        if result.is_error() {
            format!("{} {}", "Error:".red().bold(), text)
        } else {
            text
        }
    }

    /// A failure that prevented the call from completing
    pub fn format_failure(message: &str) -> String {
        format!("{} {}", "Failed:".red().bold(), message)
    }

    fn header(title: &str) -> String {
        let line = "─".repeat(title.chars().count() + 4);
        format!("{}\n  {}\n{}", line.dimmed(), title.bold(), line.dimmed())
    }
}
