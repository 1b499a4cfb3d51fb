//! CLI entrypoint for toolbridge
//!
//! This is the main binary that wires together all layers using
//! dependency injection:
//!
//! config → readiness gate (Ollama) → providers → registry → front end → close

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use toolbridge_application::{ReadinessGate, ToolCatalogPort};
use toolbridge_infrastructure::{ConfigLoader, FileConfig, OllamaClient, ProviderSet, ToolRegistry};
use toolbridge_presentation::{
    Cli, ConsoleFormatter, HttpConfig, ReplConfig, ToolRepl, http, parse_json_arguments,
    with_progress,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the subscriber; the returned guard flushes the log file on drop
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "toolbridge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();
    guard
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
    }
    .context("Failed to load configuration")?;

    let issues = config.validate();
    if !issues.is_empty() {
        let lines: Vec<String> = issues.iter().map(|i| format!("  - {}", i)).collect();
        bail!("Invalid configuration:\n{}", lines.join("\n"));
    }
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
    }
}

async fn run_front_end(
    cli: &Cli,
    config: &FileConfig,
    catalog: Arc<dyn ToolCatalogPort>,
) -> Result<()> {
    // One-shot call
    if let Some(name) = &cli.call {
        let arguments =
            parse_json_arguments(cli.args.as_deref().unwrap_or("")).context("Invalid --args")?;
        let result = with_progress(name, !cli.quiet, catalog.call_tool(name, arguments))
            .await
            .with_context(|| format!("Failed to call '{}'", name))?;
        println!("{}", ConsoleFormatter::format_result(&result));
        if result.is_error() {
            bail!("Tool '{}' reported an error", name);
        }
        return Ok(());
    }

    // HTTP API
    if cli.serve {
        let http_config = HttpConfig {
            bind_address: config.server.bind_address(),
            allowed_origin: config.server.allowed_origin.clone(),
        };
        http::serve(catalog, &http_config, shutdown_signal())
            .await
            .context("HTTP server failed")?;
        return Ok(());
    }

    // Interactive REPL
    let repl_config = ReplConfig {
        default_tool: config.repl.default_tool.clone(),
        show_progress: config.repl.show_progress && !cli.quiet,
        history_file: config.repl.history_file.clone(),
    };
    ToolRepl::new(catalog, repl_config)
        .run()
        .await
        .context("REPL failed")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = load_config(&cli)?;
    if cli.print_config {
        print!("{}", ConfigLoader::to_toml(&config)?);
        return Ok(());
    }

    info!("Starting toolbridge");

    // === Dependency Injection ===
    let ollama = Arc::new(OllamaClient::from_config(&config.ollama));
    let gate = ReadinessGate::new(
        config.readiness.max_attempts,
        Duration::from_millis(config.readiness.interval_ms),
    );
    let attempts = gate
        .wait_until_ready(ollama.as_ref())
        .await
        .context("Model host is not ready")?;
    info!(attempts, host = ollama.host(), model = ollama.model(), "Model host ready");

    let providers = ProviderSet::build(&config, ollama)
        .await
        .context("Failed to build tool providers")?;
    let registry = Arc::new(ToolRegistry::federate(providers.providers()).await);

    let stats = registry.stats();
    info!(
        providers = stats.total_providers,
        tools = stats.total_tools,
        failed = stats.failed_providers,
        "Federation complete"
    );

    let outcome = run_front_end(&cli, &config, registry.clone()).await;

    if let Err(e) = registry.close().await {
        warn!(error = %e, "Registry close reported failures");
    }
    if let Err(e) = providers.shutdown().await {
        warn!(error = %e, "Classifier link close failed");
    }

    outcome
}
