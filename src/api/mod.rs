//! API clients for external services
//!
//! - TMDB: movie/TV catalog, search and metadata
//! - Subtitles: Kurdish subtitle translation service

pub mod subtitles;
pub mod tmdb;

pub use subtitles::{SubtitleService, SubtitleServiceClient};
pub use tmdb::{Catalog, TmdbClient};
