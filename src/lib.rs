//! Cinedeck - movie and TV catalog browser with Kurdish subtitles
//!
//! Browses the TMDB catalog (trending, new, classic, search, genres),
//! shows detail pages, and hands titles to an embedded player together with
//! a Kurdish subtitle track from the subtitle service.
//!
//! # Modules
//!
//! - `config` - Startup configuration
//! - `models` - Catalog entities and display helpers
//! - `api` - TMDB and subtitle service clients
//! - `app` - Navigation and view lifetimes
//! - `home` - Landing page aggregation
//! - `paginator` - Paged, mode-switchable result lists
//! - `hero` - Hero banner rotation
//! - `detail` / `watch` - Detail and watch page controllers
//! - `stream` - Subtitle orchestration and player URLs
//! - `cli` / `commands` - Command line surface

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod detail;
pub mod hero;
pub mod home;
pub mod models;
pub mod paginator;
pub mod stream;
pub mod watch;

// Re-export commonly used types
pub use models::{
    CastMember, CatalogSort, DetailExtent, Episode, Genre, MediaDetail, MediaKind, MediaSummary,
    PagedResults, Season, TimeWindow, TrendingScope,
};

pub use api::{Catalog, SubtitleService, SubtitleServiceClient, TmdbClient};
pub use app::{App, View, ViewScope};
pub use config::Config;
