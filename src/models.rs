//! Data structures and types for cinedeck
//!
//! Contains the shared view-model entities organized by domain:
//! - **Catalog**: media summaries and details normalized from TMDB
//! - **Credits**: cast members shown on the detail page
//! - **Seasons**: TV seasons and episodes for the watch page
//! - **Paging**: paged result sets from list endpoints
//!
//! Product limits live here as named constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// =============================================================================
// Policy Constants
// =============================================================================

/// Cast entries shown on a detail page
pub const MAX_CAST_MEMBERS: usize = 10;

/// Upstream never serves pages past this bound
pub const MAX_TOTAL_PAGES: u32 = 500;

/// A title is "classic" once it is this many years old
pub const CLASSIC_AGE_YEARS: i32 = 20;

/// Minimum vote count for classic movies
pub const CLASSIC_MOVIE_VOTE_FLOOR: u32 = 1000;

/// Minimum vote count for classic TV shows
pub const CLASSIC_TV_VOTE_FLOOR: u32 = 500;

/// Minimum vote count when a discover list is sorted by rating
pub const TOP_RATED_VOTE_FLOOR: u32 = 200;

/// Number of trending items that rotate through the hero banner
pub const HERO_WINDOW: usize = 10;

/// Trending shelf ends before this index of the trending feed
pub const TRENDING_SHELF_END: usize = 20;

/// Hero banner rotation period
pub const HERO_INTERVAL: Duration = Duration::from_secs(5);

const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/500x750?text=No+Image";

// =============================================================================
// Catalog Models (TMDB)
// =============================================================================

/// Movie/TV discriminant attached to every catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// URL path segment used by TMDB and the player
    pub fn path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Parse TMDB's `media_type` field; anything else (e.g. "person") is `None`
    pub fn from_media_type(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(MediaKind::Movie),
            "tv" => Some(MediaKind::Tv),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "Movie"),
            MediaKind::Tv => write!(f, "TV Show"),
        }
    }
}

/// Scope of the trending feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendingScope {
    #[default]
    All,
    Movie,
    Tv,
}

impl TrendingScope {
    pub fn path(&self) -> &'static str {
        match self {
            TrendingScope::All => "all",
            TrendingScope::Movie => "movie",
            TrendingScope::Tv => "tv",
        }
    }
}

impl From<MediaKind> for TrendingScope {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Movie => TrendingScope::Movie,
            MediaKind::Tv => TrendingScope::Tv,
        }
    }
}

/// Time window of the trending feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn path(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

/// Sort mode of a catalog list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSort {
    #[default]
    Popular,
    TopRated,
    Newest,
}

impl CatalogSort {
    /// `sort_by` value for the discover endpoint
    pub fn discover_sort_by(&self, kind: MediaKind) -> &'static str {
        match (self, kind) {
            (CatalogSort::Popular, _) => "popularity.desc",
            (CatalogSort::TopRated, _) => "vote_average.desc",
            (CatalogSort::Newest, MediaKind::Movie) => "primary_release_date.desc",
            (CatalogSort::Newest, MediaKind::Tv) => "first_air_date.desc",
        }
    }
}

impl fmt::Display for CatalogSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSort::Popular => write!(f, "Popular"),
            CatalogSort::TopRated => write!(f, "Top Rated"),
            CatalogSort::Newest => write!(f, "Newest"),
        }
    }
}

/// Catalog item as shown on cards, shelves and the hero banner
///
/// Title and kind are resolved once when the payload is normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSummary {
    pub id: u64,
    pub kind: MediaKind,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f32>,
    pub release_date: Option<String>,
}

impl MediaSummary {
    /// Year from the release/air date, if the date is usable
    pub fn year(&self) -> Option<u16> {
        self.release_date.as_deref().and_then(extract_year)
    }

    /// Rating with one decimal, or "N/A" when absent or unrated
    pub fn rating_label(&self) -> String {
        rating_label(self.vote_average)
    }

    pub fn poster_url(&self, size: &str) -> String {
        image_url(self.poster_path.as_deref(), size)
    }

    pub fn backdrop_url(&self, size: &str) -> String {
        image_url(self.backdrop_path.as_deref(), size)
    }
}

impl fmt::Display for MediaSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year().map(|y| format!(" ({})", y)).unwrap_or_default();
        write!(
            f,
            "{}{} [{}] ⭐ {}",
            self.title,
            year_str,
            self.kind,
            self.rating_label()
        )
    }
}

/// Genre id/name pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}  {}", self.id, self.name)
    }
}

/// Kind-specific part of a detail payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DetailExtent {
    Movie {
        runtime: Option<u32>,
    },
    Tv {
        number_of_seasons: Option<u32>,
        number_of_episodes: Option<u32>,
        seasons: Vec<Season>,
    },
}

/// Detailed movie or TV information, fetched per detail-page visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDetail {
    pub summary: MediaSummary,
    pub genres: Vec<Genre>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub extent: DetailExtent,
}

impl MediaDetail {
    /// Runtime label for movies ("148 min")
    pub fn runtime_label(&self) -> Option<String> {
        match &self.extent {
            DetailExtent::Movie { runtime: Some(mins) } if *mins > 0 => {
                Some(format!("{} min", mins))
            }
            _ => None,
        }
    }

    /// Season count label for TV ("1 Season", "5 Seasons")
    pub fn seasons_label(&self) -> Option<String> {
        match &self.extent {
            DetailExtent::Tv {
                number_of_seasons: Some(n),
                ..
            } if *n > 0 => Some(format!("{} Season{}", n, if *n > 1 { "s" } else { "" })),
            _ => None,
        }
    }

    /// Playable seasons (TV only)
    pub fn seasons(&self) -> &[Season] {
        match &self.extent {
            DetailExtent::Tv { seasons, .. } => seasons,
            DetailExtent::Movie { .. } => &[],
        }
    }

    pub fn genres_str(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MediaDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self
            .summary
            .year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        write!(f, "{} ({})", self.summary.title, year)?;
        if let Some(runtime) = self.runtime_label() {
            write!(f, " - {}", runtime)?;
        }
        if let Some(seasons) = self.seasons_label() {
            write!(f, " - {}", seasons)?;
        }
        write!(f, " - ⭐ {}", self.summary.rating_label())
    }
}

// =============================================================================
// Credits
// =============================================================================

/// Cast entry from the credits endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

impl CastMember {
    pub fn portrait_url(&self) -> String {
        image_url(self.profile_path.as_deref(), "w185")
    }
}

impl fmt::Display for CastMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.character.as_deref() {
            Some(character) if !character.is_empty() => {
                write!(f, "{} as {}", self.name, character)
            }
            _ => write!(f, "{}", self.name),
        }
    }
}

// =============================================================================
// Seasons & Episodes
// =============================================================================

/// TV season offered on the watch page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub season_number: u32,
    pub name: String,
    pub episode_count: Option<u32>,
    pub air_date: Option<String>,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.episode_count {
            Some(count) => write!(f, "{} ({} episodes)", self.name, count),
            None => write!(f, "{}", self.name),
        }
    }
}

/// TV episode within a season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub season_number: u32,
    pub episode_number: u32,
    pub name: String,
    pub overview: String,
    pub vote_average: Option<f32>,
    pub still_path: Option<String>,
}

impl Episode {
    pub fn rating_label(&self) -> String {
        rating_label(self.vote_average)
    }

    pub fn still_url(&self) -> String {
        image_url(self.still_path.as_deref(), "w300")
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S{:02}E{:02} - {}",
            self.season_number, self.episode_number, self.name
        )
    }
}

// =============================================================================
// Paging
// =============================================================================

/// One page of results plus the source-reported page count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResults<T> {
    pub results: Vec<T>,
    pub total_pages: u32,
}

impl<T> PagedResults<T> {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            total_pages: 0,
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Build a TMDB image URL, or the placeholder when there is no path
pub fn image_url(path: Option<&str>, size: &str) -> String {
    match path {
        Some(p) if !p.is_empty() => format!("{}/{}{}", IMAGE_BASE, size, p),
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}

/// Format a rating for display
pub fn rating_label(vote_average: Option<f32>) -> String {
    match vote_average {
        Some(v) if v > 0.0 => format!("{:.1}", v),
        _ => "N/A".to_string(),
    }
}

/// Extract year from a date string like "2022-03-04"
pub fn extract_year(date: &str) -> Option<u16> {
    date.get(..4).and_then(|y| y.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(vote_average: Option<f32>) -> MediaSummary {
        MediaSummary {
            id: 603,
            kind: MediaKind::Movie,
            title: "The Matrix".into(),
            overview: String::new(),
            poster_path: Some("/matrix.jpg".into()),
            backdrop_path: None,
            vote_average,
            release_date: Some("1999-03-30".into()),
        }
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("2022-03-04"), Some(2022));
        assert_eq!(extract_year("2019-11-12"), Some(2019));
        assert_eq!(extract_year(""), None);
        assert_eq!(extract_year("abc"), None);
    }

    #[test]
    fn test_media_kind_parsing() {
        assert_eq!(MediaKind::from_media_type("movie"), Some(MediaKind::Movie));
        assert_eq!(MediaKind::from_media_type("tv"), Some(MediaKind::Tv));
        assert_eq!(MediaKind::from_media_type("person"), None);
        assert_eq!(MediaKind::Tv.path(), "tv");
    }

    #[test]
    fn test_rating_label() {
        assert_eq!(summary(Some(8.16)).rating_label(), "8.2");
        assert_eq!(summary(None).rating_label(), "N/A");
        assert_eq!(summary(Some(0.0)).rating_label(), "N/A");
    }

    #[test]
    fn test_image_url_placeholder() {
        let s = summary(None);
        assert_eq!(
            s.poster_url("w342"),
            "https://image.tmdb.org/t/p/w342/matrix.jpg"
        );
        assert_eq!(s.backdrop_url("original"), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_detail_labels() {
        let movie = MediaDetail {
            summary: summary(Some(8.2)),
            genres: vec![
                Genre { id: 28, name: "Action".into() },
                Genre { id: 878, name: "Science Fiction".into() },
            ],
            tagline: None,
            status: Some("Released".into()),
            extent: DetailExtent::Movie { runtime: Some(136) },
        };
        assert_eq!(movie.runtime_label().as_deref(), Some("136 min"));
        assert_eq!(movie.seasons_label(), None);
        assert_eq!(movie.genres_str(), "Action, Science Fiction");
        assert!(movie.seasons().is_empty());

        let show = MediaDetail {
            extent: DetailExtent::Tv {
                number_of_seasons: Some(1),
                number_of_episodes: Some(8),
                seasons: Vec::new(),
            },
            ..movie
        };
        assert_eq!(show.seasons_label().as_deref(), Some("1 Season"));
        assert_eq!(show.runtime_label(), None);
    }

    #[test]
    fn test_episode_display() {
        let ep = Episode {
            season_number: 1,
            episode_number: 3,
            name: "...And the Bag's in the River".into(),
            overview: String::new(),
            vote_average: None,
            still_path: None,
        };
        assert_eq!(ep.to_string(), "S01E03 - ...And the Bag's in the River");
        assert_eq!(ep.rating_label(), "N/A");
    }
}
