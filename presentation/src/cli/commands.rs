//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for toolbridge
#[derive(Parser, Debug)]
#[command(name = "toolbridge")]
#[command(author, version, about = "Federated tool bridge - time, weather, music and web search tools")]
#[command(long_about = r#"
toolbridge federates several in-process tool providers into one catalog and
exposes it through an interactive REPL, an HTTP API or a one-shot call.

Startup:
1. Load configuration
2. Wait for the Ollama host to become reachable
3. Federate every provider into the registry

Configuration files are loaded from (in priority order):
1. --config <path>          Explicit config file
2. ./toolbridge.toml        Project-level config
3. ~/.config/toolbridge/config.toml   Global config
Environment (OLLAMA_HOST, SPOTIFY_CLIENT_ID, TOOLBRIDGE_SERVER__PORT, ...)
overrides every file.

Example:
  toolbridge
  toolbridge --serve
  toolbridge --call get-weather --args '{"name": "東京"}'
"#)]
pub struct Cli {
    /// Serve the HTTP API instead of starting the REPL
    #[arg(long, conflicts_with = "call")]
    pub serve: bool,

    /// Call one tool and exit
    #[arg(long, value_name = "TOOL")]
    pub call: Option<String>,

    /// JSON object of arguments for --call
    #[arg(long, value_name = "JSON", requires = "call")]
    pub args: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Also write a daily-rotated log file into this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}
