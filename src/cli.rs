//! CLI - Command Line Interface for Cinedeck
//!
//! Every page of the catalog browser is reachable as a subcommand.
//! All output is JSON-parseable with `--json`.
//!
//! # Examples
//!
//! ```bash
//! # Landing page shelves
//! cinedeck home
//!
//! # Paged lists
//! cinedeck search "the batman" --page 2
//! cinedeck tv --sort top-rated
//! cinedeck movies --genre 878 --sort newest
//!
//! # Player URL with Kurdish subtitle
//! cinedeck watch tv 1399 -s 1 -e 3 --json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::api::tmdb::TmdbError;
use crate::models::{CatalogSort, MediaKind, MediaSummary};
use crate::stream::subtitles::SubtitleState;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Title, season or episode not found
    NotFound = 4,
    /// Query produced no results
    NoResults = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<&TmdbError> for ExitCode {
    fn from(err: &TmdbError) -> ExitCode {
        match err {
            TmdbError::NotFound => ExitCode::NotFound,
            TmdbError::RequestFailed(_) | TmdbError::Status { .. } => ExitCode::NetworkError,
            TmdbError::InvalidResponse(_) => ExitCode::Error,
        }
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Cinedeck - movie and TV catalog browser with Kurdish subtitles
#[derive(Parser, Debug)]
#[command(
    name = "cinedeck",
    version,
    author = "Gorka & Hermes",
    about = "Movie and TV catalog browser with Kurdish subtitles",
    long_about = "Browse trending, new and classic titles from TMDB, page through \
                  search results and catalogs, and get an embedded player URL \
                  with a Kurdish subtitle track.",
    after_help = "EXAMPLES:\n\
                  cinedeck home                         Landing page shelves\n\
                  cinedeck search \"blade runner\"        Search movies and TV\n\
                  cinedeck info movie 603               Movie details and cast\n\
                  cinedeck watch tv 1399 -s 1 -e 1      Player URL with subtitle"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Landing page: hero and shelves
    Home(HomeCmd),

    /// Rotate the hero banner over the trending window
    Hero(HeroCmd),

    /// Search movies and TV shows
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// Browse TV shows
    Tv(TvCmd),

    /// Browse movies, optionally by genre
    Movies(MoviesCmd),

    /// List genres
    Genres(GenresCmd),

    /// Details and cast for a movie or TV show
    #[command(visible_alias = "i")]
    Info(InfoCmd),

    /// List seasons of a TV show
    Seasons(SeasonsCmd),

    /// List episodes of a season
    Episodes(EpisodesCmd),

    /// Build the player URL, with subtitle when available
    #[command(visible_alias = "w")]
    Watch(WatchCmd),
}

/// Media kind argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    /// Movies
    Movie,
    /// TV shows
    Tv,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> MediaKind {
        match kind {
            KindArg::Movie => MediaKind::Movie,
            KindArg::Tv => MediaKind::Tv,
        }
    }
}

/// Catalog ordering argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortArg {
    /// Most popular first (default)
    #[default]
    Popular,
    /// Highest rated first
    TopRated,
    /// Most recent first
    Newest,
}

impl From<SortArg> for CatalogSort {
    fn from(sort: SortArg) -> CatalogSort {
        match sort {
            SortArg::Popular => CatalogSort::Popular,
            SortArg::TopRated => CatalogSort::TopRated,
            SortArg::Newest => CatalogSort::Newest,
        }
    }
}

// =============================================================================
// Browse Commands
// =============================================================================

/// Show the landing page
#[derive(Args, Debug)]
pub struct HomeCmd {
    /// Maximum items listed per shelf
    #[arg(long, short = 'l', default_value = "20")]
    pub limit: usize,
}

/// Rotate the hero banner
#[derive(Args, Debug)]
pub struct HeroCmd {
    /// Number of rotations to show before exiting
    #[arg(long, short = 't', default_value = "3")]
    pub ticks: u32,

    /// Start at this hero index
    #[arg(long)]
    pub select: Option<usize>,
}

/// Search movies and TV shows by query
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search query (title, keywords)
    #[arg(required = true)]
    pub query: String,

    /// Page number
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

/// Browse the TV catalog
#[derive(Args, Debug)]
pub struct TvCmd {
    /// Ordering
    #[arg(long, value_enum, default_value = "popular")]
    pub sort: SortArg,

    /// Page number
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

/// Browse movies
#[derive(Args, Debug)]
pub struct MoviesCmd {
    /// Genre ID (see `cinedeck genres movie`)
    #[arg(long, short = 'g')]
    pub genre: Option<u32>,

    /// Ordering
    #[arg(long, value_enum, default_value = "popular")]
    pub sort: SortArg,

    /// Page number
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

/// List genres for a media kind
#[derive(Args, Debug)]
pub struct GenresCmd {
    #[arg(value_enum, default_value = "movie")]
    pub kind: KindArg,
}

// =============================================================================
// Title Commands
// =============================================================================

/// Get detailed information about a movie or TV show
#[derive(Args, Debug)]
pub struct InfoCmd {
    #[arg(value_enum)]
    pub kind: KindArg,

    /// TMDB ID
    pub id: u64,
}

/// List seasons of a TV show
#[derive(Args, Debug)]
pub struct SeasonsCmd {
    /// TMDB ID of the show
    pub id: u64,
}

/// List episodes of one season
#[derive(Args, Debug)]
pub struct EpisodesCmd {
    /// TMDB ID of the show
    pub id: u64,

    /// Season number
    pub season: u32,
}

/// Build the player URL for a movie or episode
#[derive(Args, Debug)]
pub struct WatchCmd {
    #[arg(value_enum)]
    pub kind: KindArg,

    /// TMDB ID
    pub id: u64,

    /// Season number (TV only, defaults to the first season)
    #[arg(long, short = 's')]
    pub season: Option<u32>,

    /// Episode number (TV only, defaults to the first episode)
    #[arg(long, short = 'e')]
    pub episode: Option<u32>,

    /// Play without requesting a subtitle
    #[arg(long)]
    pub no_subtitle: bool,
}

impl WatchCmd {
    /// Season/episode flags only make sense for TV
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.kind == KindArg::Movie && (self.season.is_some() || self.episode.is_some()) {
            return Err("--season/--episode apply to TV shows only");
        }
        Ok(())
    }
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// One page of a paged list
#[derive(Debug, Serialize)]
pub struct PageOutput {
    pub mode: String,
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<MediaSummary>,
}

/// One hero frame
#[derive(Debug, Serialize)]
pub struct HeroFrame {
    pub tick: u32,
    pub cursor: usize,
    pub item: Option<MediaSummary>,
}

/// Watch command response
#[derive(Debug, Serialize)]
pub struct WatchResponse {
    pub url: String,
    pub kind: MediaKind,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    pub subtitle: SubtitleState,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data as a JSON envelope
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let output = JsonOutput::success(data);
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    /// Print a plain line to stdout (human mode)
    pub fn line(&self, msg: impl std::fmt::Display) {
        println!("{}", msg);
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // Verify CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["cinedeck"]).is_err());
    }

    #[test]
    fn test_search_command() {
        let cli = Cli::parse_from(["cinedeck", "search", "batman", "--page", "3"]);
        if let Command::Search(cmd) = cli.command {
            assert_eq!(cmd.query, "batman");
            assert_eq!(cmd.page, 3);
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_page_zero_rejected() {
        assert!(Cli::try_parse_from(["cinedeck", "search", "x", "--page", "0"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "cinedeck",
            "--json",
            "--quiet",
            "--config",
            "/tmp/c.toml",
            "home",
        ]);
        assert!(cli.json);
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_tv_sort() {
        let cli = Cli::parse_from(["cinedeck", "tv", "--sort", "top-rated"]);
        if let Command::Tv(cmd) = cli.command {
            assert_eq!(CatalogSort::from(cmd.sort), CatalogSort::TopRated);
            assert_eq!(cmd.page, 1);
        } else {
            panic!("Expected Tv command");
        }
    }

    #[test]
    fn test_movies_genre() {
        let cli = Cli::parse_from(["cinedeck", "movies", "-g", "878", "--sort", "newest"]);
        if let Command::Movies(cmd) = cli.command {
            assert_eq!(cmd.genre, Some(878));
            assert_eq!(cmd.sort, SortArg::Newest);
        } else {
            panic!("Expected Movies command");
        }
    }

    #[test]
    fn test_watch_with_options() {
        let cli = Cli::parse_from([
            "cinedeck",
            "watch",
            "tv",
            "1399",
            "-s",
            "2",
            "-e",
            "5",
            "--no-subtitle",
        ]);
        if let Command::Watch(cmd) = cli.command {
            assert_eq!(MediaKind::from(cmd.kind), MediaKind::Tv);
            assert_eq!(cmd.id, 1399);
            assert_eq!(cmd.season, Some(2));
            assert_eq!(cmd.episode, Some(5));
            assert!(cmd.no_subtitle);
            assert!(cmd.validate().is_ok());
        } else {
            panic!("Expected Watch command");
        }
    }

    #[test]
    fn test_watch_movie_rejects_episode() {
        let cli = Cli::parse_from(["cinedeck", "watch", "movie", "603", "-e", "1"]);
        if let Command::Watch(cmd) = cli.command {
            assert!(cmd.validate().is_err());
        } else {
            panic!("Expected Watch command");
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::Error), 1);
        assert_eq!(i32::from(ExitCode::InvalidArgs), 2);
        assert_eq!(i32::from(ExitCode::NetworkError), 3);
        assert_eq!(i32::from(ExitCode::NotFound), 4);
        assert_eq!(i32::from(ExitCode::NoResults), 5);
    }

    #[test]
    fn test_tmdb_error_exit_codes() {
        assert_eq!(ExitCode::from(&TmdbError::NotFound), ExitCode::NotFound);
        assert_eq!(
            ExitCode::from(&TmdbError::Status {
                code: 500,
                reason: "Internal Server Error".into()
            }),
            ExitCode::NetworkError
        );
    }
}
