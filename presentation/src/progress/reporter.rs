//! Progress indicator for tool calls

use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// Spinner shown while a tool call is in flight
pub struct CallProgress {
    bar: Option<ProgressBar>,
}

impl CallProgress {
    /// Start a spinner for `tool`; a disabled progress draws nothing
    pub fn start(tool: &str, enabled: bool) -> Self {
        if !enabled {
            return Self { bar: None };
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {prefix:.bold.cyan} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_prefix(tool.to_string());
        bar.set_message("calling...");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }

    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

/// Await `future` with a spinner labelled `tool`
pub async fn with_progress<F: Future>(tool: &str, enabled: bool, future: F) -> F::Output {
    let progress = CallProgress::start(tool, enabled);
    let output = future.await;
    progress.finish();
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_progress_passes_output_through() {
        let progress = CallProgress::start("get-weather", false);
        assert!(!progress.is_visible());
        progress.finish();

        assert_eq!(with_progress("x", false, async { 42 }).await, 42);
    }

    #[tokio::test]
    async fn test_enabled_progress_finishes() {
        let value = with_progress("get-current-time", true, async { "done" }).await;
        assert_eq!(value, "done");
    }
}
