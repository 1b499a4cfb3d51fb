//! REPL (Read-Eval-Print Loop) over the federated tool catalog

use crate::chat::command::ReplCommand;
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::with_progress;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::sync::Arc;
use toolbridge_application::ToolCatalogPort;
use tracing::{debug, warn};

const HISTORY_CAPACITY: usize = 1000;

/// What the loop should do after one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplOutcome {
    Print(String),
    Quit,
}

/// Interactive tool REPL
pub struct ToolRepl {
    catalog: Arc<dyn ToolCatalogPort>,
    config: ReplConfig,
}

impl ToolRepl {
    pub fn new(catalog: Arc<dyn ToolCatalogPort>, config: ReplConfig) -> Self {
        Self { catalog, config }
    }

    /// Run the interactive REPL until `/quit` or Ctrl-D
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = self.editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("toolbridge".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            let signal = tokio::task::block_in_place(|| editor.read_line(&prompt))?;
            let line = match signal {
                Signal::Success(line) => line,
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
                _ => {
                    println!("^C");
                    continue;
                }
            };

            let command = match ReplCommand::parse(&line, &self.config.default_tool) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    println!("{}", ConsoleFormatter::format_failure(&e.to_string()));
                    continue;
                }
            };

            match self.execute(command).await {
                ReplOutcome::Print(output) => println!("{}\n", output),
                ReplOutcome::Quit => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = self.config.history_path() else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "History disabled");
                editor
            }
        }
    }

    /// Execute one parsed command. Failures are rendered, never returned.
    pub async fn execute(&self, command: ReplCommand) -> ReplOutcome {
        match command {
            ReplCommand::Quit => ReplOutcome::Quit,
            ReplCommand::Help => ReplOutcome::Print(self.help()),
            ReplCommand::Tools => match self.catalog.list_tools().await {
                Ok(tools) => ReplOutcome::Print(ConsoleFormatter::format_tools(&tools)),
                Err(e) => ReplOutcome::Print(ConsoleFormatter::format_failure(&e.to_string())),
            },
            ReplCommand::Call { name, arguments } => {
                debug!(tool = %name, "REPL call");
                let call = self.catalog.call_tool(&name, arguments);
                match with_progress(&name, self.config.show_progress, call).await {
                    Ok(result) => ReplOutcome::Print(ConsoleFormatter::format_result(&result)),
                    Err(e) => {
                        ReplOutcome::Print(ConsoleFormatter::format_failure(&e.to_string()))
                    }
                }
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              toolbridge - REPL              │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("{}", self.help());
    }

    fn help(&self) -> String {
        format!(
            "Commands:\n\
             \x20 /tools               - List available tools\n\
             \x20 /call <name> [json]  - Call a tool with a JSON object of arguments\n\
             \x20 /help                - Show this help\n\
             \x20 /quit                - Exit\n\
             \n\
             Any other input is sent to '{}' as {{\"query\": ...}}",
            self.config.default_tool
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use toolbridge_application::CatalogError;
    use toolbridge_domain::tool::{CallToolResult, ToolArguments, ToolDescriptor};

    #[derive(Default)]
    struct FakeCatalog {
        calls: Mutex<Vec<(String, ToolArguments)>>,
    }

    #[async_trait]
    impl ToolCatalogPort for FakeCatalog {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, CatalogError> {
            Ok(vec![ToolDescriptor::new("get-current-time", "Current time")])
        }

        async fn call_tool(
            &self,
            name: &str,
            arguments: ToolArguments,
        ) -> Result<CallToolResult, CatalogError> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), arguments));
            match name {
                "missing" => Err(CatalogError::ToolNotFound(name.to_string())),
                _ => Ok(CallToolResult::text(format!("{} ok", name))),
            }
        }
    }

    fn repl(catalog: Arc<FakeCatalog>) -> ToolRepl {
        let config = ReplConfig {
            show_progress: false,
            ..Default::default()
        };
        ToolRepl::new(catalog, config)
    }

    #[tokio::test]
    async fn test_plain_text_calls_default_tool() {
        colored::control::set_override(false);
        let catalog = Arc::new(FakeCatalog::default());
        let repl = repl(catalog.clone());

        let command = ReplCommand::parse("Lemon", "search-track").unwrap().unwrap();
        let outcome = repl.execute(command).await;

        assert_eq!(outcome, ReplOutcome::Print("search-track ok".into()));
        assert_eq!(catalog.calls.lock().unwrap()[0].0, "search-track");
    }

    #[tokio::test]
    async fn test_failed_call_is_printed_and_loop_continues() {
        colored::control::set_override(false);
        let repl = repl(Arc::new(FakeCatalog::default()));

        let outcome = repl
            .execute(ReplCommand::Call {
                name: "missing".into(),
                arguments: ToolArguments::new(),
            })
            .await;

        let ReplOutcome::Print(text) = outcome else {
            panic!("expected printed output");
        };
        assert!(text.starts_with("Failed:"));
        assert!(text.contains("missing"));
    }

    #[tokio::test]
    async fn test_tools_and_quit() {
        colored::control::set_override(false);
        let repl = repl(Arc::new(FakeCatalog::default()));

        let ReplOutcome::Print(text) = repl.execute(ReplCommand::Tools).await else {
            panic!("expected printed output");
        };
        assert!(text.contains("get-current-time"));
        assert_eq!(repl.execute(ReplCommand::Quit).await, ReplOutcome::Quit);
    }

    #[tokio::test]
    async fn test_help_names_default_tool() {
        let repl = repl(Arc::new(FakeCatalog::default()));
        let ReplOutcome::Print(text) = repl.execute(ReplCommand::Help).await else {
            panic!("expected printed output");
        };
        assert!(text.contains("'search-track'"));
    }
}
