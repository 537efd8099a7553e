//! mdpane CLI - sidebar markdown editor and previewer.
//!
//! Provides commands for:
//! - `bridge`: Run an editing session over JSON lines on stdin/stdout
//! - `open`: Open a file, record it as recent and print its content
//! - `recent`: List recently opened files
//! - `preview`: Render a markdown file to preview HTML

mod commands;
mod error;
mod host;
mod output;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BridgeArgs, OpenArgs, PreviewArgs, RecentArgs};
use error::CliError;
use mdpane_config::{CliSettings, Config};
use output::Output;

/// mdpane - Sidebar markdown editor and previewer.
#[derive(Parser)]
#[command(name = "mdpane", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover mdpane.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long, global = true, env = "MDPANE_KROKI_URL")]
    kroki_url: Option<String>,

    /// Directory for persisted session state (overrides config).
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an editing session over JSON lines on stdin/stdout.
    Bridge(BridgeArgs),
    /// Open a markdown file and print its content.
    Open(OpenArgs),
    /// List recently opened files.
    Recent(RecentArgs),
    /// Render a markdown file to preview HTML.
    Preview(PreviewArgs),
}

impl Cli {
    /// CLI overrides for config loading.
    fn settings(&self) -> CliSettings {
        let auto_save = match &self.command {
            Commands::Bridge(args) if args.no_auto_save => Some(false),
            _ => None,
        };
        CliSettings {
            kroki_url: self.kroki_url.clone(),
            state_dir: self.state_dir.clone(),
            auto_save,
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref(), Some(&cli.settings()))?;
    if let Some(path) = &config.config_path {
        tracing::info!(path = %path.display(), "Loaded config");
    }

    match cli.command {
        Commands::Recent(args) => args.execute(&config),
        Commands::Bridge(args) => runtime().block_on(args.execute(&config)),
        Commands::Open(args) => runtime().block_on(args.execute(&config)),
        Commands::Preview(args) => runtime().block_on(args.execute(&config)),
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().expect("Failed to create tokio runtime")
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bridge_no_auto_save() {
        let cli = Cli::try_parse_from(["mdpane", "bridge", "--no-auto-save"]).unwrap();

        let settings = cli.settings();

        assert_eq!(settings.auto_save, Some(false));
        assert!(matches!(cli.command, Commands::Bridge(_)));
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mdpane",
            "preview",
            "doc.md",
            "-o",
            "doc.html",
            "--kroki-url",
            "https://kroki.example.com",
            "--state-dir",
            "/tmp/state",
            "-v",
        ])
        .unwrap();

        let settings = cli.settings();

        assert!(cli.verbose);
        assert_eq!(
            settings.kroki_url.as_deref(),
            Some("https://kroki.example.com")
        );
        assert_eq!(settings.state_dir, Some(PathBuf::from("/tmp/state")));
        assert_eq!(settings.auto_save, None);
    }

    #[test]
    fn test_open_requires_path() {
        assert!(Cli::try_parse_from(["mdpane", "open"]).is_err());
        assert!(Cli::try_parse_from(["mdpane", "open", "notes.md"]).is_ok());
    }

    #[test]
    fn test_recent_last_flag() {
        let cli = Cli::try_parse_from(["mdpane", "recent", "--last"]).unwrap();
        assert!(matches!(cli.command, Commands::Recent(_)));
    }
}
