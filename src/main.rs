//! Cinedeck - movie and TV catalog browser with Kurdish subtitles
//!
//! # Usage
//!
//! ```bash
//! cinedeck home
//! cinedeck search "blade runner" --page 2
//! cinedeck watch movie 603 --json
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=cinedeck=debug` for request traces.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cinedeck::cli::{Cli, Command, ExitCode, Output};
use cinedeck::commands;
use cinedeck::config::Config;

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let exit_code = run_cli(cli).await;
    std::process::exit(exit_code.into());
}

/// Install the stderr subscriber; `RUST_LOG` overrides the default level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return output.error(e.to_string(), ExitCode::Error),
    };
    tracing::debug!(
        tmdb = %config.tmdb_base_url,
        subtitles = %config.subtitle_service_url,
        player = %config.player_base_url,
        "Configuration resolved"
    );

    match cli.command {
        Command::Home(cmd) => commands::home_cmd(cmd, &config, &output).await,

        Command::Hero(cmd) => commands::hero_cmd(cmd, &config, &output).await,

        Command::Search(cmd) => commands::search_cmd(cmd, &config, &output).await,

        Command::Tv(cmd) => commands::tv_cmd(cmd, &config, &output).await,

        Command::Movies(cmd) => commands::movies_cmd(cmd, &config, &output).await,

        Command::Genres(cmd) => commands::genres_cmd(cmd, &config, &output).await,

        Command::Info(cmd) => commands::info_cmd(cmd, &config, &output).await,

        Command::Seasons(cmd) => commands::seasons_cmd(cmd, &config, &output).await,

        Command::Episodes(cmd) => commands::episodes_cmd(cmd, &config, &output).await,

        Command::Watch(cmd) => commands::watch_cmd(cmd, &config, &output).await,
    }
}
