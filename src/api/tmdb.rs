//! TMDB (The Movie Database) API client
//!
//! Provides the catalog queries behind every page: trending, popular,
//! top rated, new releases, classics, genre discovery, search, details,
//! credits and seasons.
//! API docs: https://developer.themoviedb.org/docs

use async_trait::async_trait;
use chrono::Datelike;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::models::{
    CastMember, CatalogSort, DetailExtent, Episode, Genre, MediaDetail, MediaKind, MediaSummary,
    PagedResults, Season, TimeWindow, TrendingScope, CLASSIC_AGE_YEARS, CLASSIC_MOVIE_VOTE_FLOOR,
    CLASSIC_TV_VOTE_FLOOR, MAX_CAST_MEMBERS, TOP_RATED_VOTE_FLOOR,
};

/// Default TMDB v3 endpoint
pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TMDB API error types
#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("Resource not found (404)")]
    NotFound,

    #[error("TMDB API error: {code} {reason}")]
    Status { code: u16, reason: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Catalog queries used by the page controllers
///
/// Implemented by [`TmdbClient`]; controllers take `&dyn Catalog` so they can
/// be driven by fakes in tests.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn trending(
        &self,
        scope: TrendingScope,
        window: TimeWindow,
    ) -> Result<Vec<MediaSummary>, TmdbError>;

    async fn popular(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError>;

    async fn top_rated(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError>;

    /// Now playing (movies) or on the air (TV)
    async fn new_releases(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError>;

    /// Highest rated titles at least [`CLASSIC_AGE_YEARS`] old
    async fn classic(&self, kind: MediaKind) -> Result<Vec<MediaSummary>, TmdbError>;

    async fn discover_by_genre(
        &self,
        kind: MediaKind,
        genre: Option<u32>,
        sort: CatalogSort,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError>;

    async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, TmdbError>;

    /// Multi-search; only movie and TV results are kept
    async fn search(
        &self,
        query: &str,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError>;

    async fn detail(&self, kind: MediaKind, id: u64) -> Result<MediaDetail, TmdbError>;

    /// First [`MAX_CAST_MEMBERS`] cast entries
    async fn credits(&self, kind: MediaKind, id: u64) -> Result<Vec<CastMember>, TmdbError>;

    /// Seasons of a show, specials excluded
    async fn seasons(&self, id: u64) -> Result<Vec<Season>, TmdbError>;

    async fn season_episodes(&self, id: u64, season: u32) -> Result<Vec<Episode>, TmdbError>;
}

// =============================================================================
// Classic Query
// =============================================================================

/// Derived "classic" discover query, pinned to a reference year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassicQuery {
    pub kind: MediaKind,
    pub year: i32,
}

impl ClassicQuery {
    pub fn new(kind: MediaKind, year: i32) -> Self {
        Self { kind, year }
    }

    /// Classic query relative to the current local year
    pub fn as_of_today(kind: MediaKind) -> Self {
        Self::new(kind, chrono::Local::now().year())
    }

    pub fn vote_floor(&self) -> u32 {
        match self.kind {
            MediaKind::Movie => CLASSIC_MOVIE_VOTE_FLOOR,
            MediaKind::Tv => CLASSIC_TV_VOTE_FLOOR,
        }
    }

    /// Last date a title may have been released to count as classic
    pub fn cutoff_date(&self) -> String {
        format!("{}-12-31", self.year - CLASSIC_AGE_YEARS)
    }

    pub fn endpoint(&self) -> String {
        let date_field = match self.kind {
            MediaKind::Movie => "primary_release_date",
            MediaKind::Tv => "first_air_date",
        };
        format!(
            "/discover/{}?sort_by=vote_average.desc&vote_count.gte={}&{}.lte={}",
            self.kind.path(),
            self.vote_floor(),
            date_field,
            self.cutoff_date()
        )
    }
}

// =============================================================================
// Client
// =============================================================================

/// TMDB API client
#[derive(Debug, Clone)]
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, TMDB_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::build(api_key.into(), base_url.into(), DEFAULT_TIMEOUT)
    }

    /// Create a client from startup configuration
    pub fn from_config(config: &Config) -> Self {
        Self::build(
            config.tmdb_api_key.clone(),
            config.tmdb_base_url.clone(),
            config.request_timeout(),
        )
    }

    fn build(api_key: String, base_url: String, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Full request URL with the API key appended
    fn url(&self, endpoint: &str) -> String {
        let sep = if endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}api_key={}",
            self.base_url, endpoint, sep, self.api_key
        )
    }

    /// Issue a GET and decode the JSON body. No retries.
    async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T, TmdbError> {
        tracing::debug!(endpoint, "TMDB request");

        let response = self
            .client
            .get(self.url(endpoint))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body).map_err(|e| {
                tracing::warn!(endpoint, error = %e, "TMDB response did not parse");
                TmdbError::InvalidResponse(format!("JSON parse error: {}", e))
            });
        }

        tracing::warn!(endpoint, status = status.as_u16(), "TMDB request failed");
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TmdbError::NotFound);
        }
        Err(TmdbError::Status {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        })
    }

    async fn get_page(
        &self,
        endpoint: &str,
        context: Option<MediaKind>,
    ) -> Result<PagedResults<MediaSummary>, TmdbError> {
        let response: PageResponse = self.get(endpoint).await?;
        Ok(response.into_paged(context))
    }

    /// Classic titles for an explicit reference year
    pub async fn classic_as_of(&self, query: ClassicQuery) -> Result<Vec<MediaSummary>, TmdbError> {
        let page = self.get_page(&query.endpoint(), Some(query.kind)).await?;
        Ok(page.results)
    }
}

#[async_trait]
impl Catalog for TmdbClient {
    async fn trending(
        &self,
        scope: TrendingScope,
        window: TimeWindow,
    ) -> Result<Vec<MediaSummary>, TmdbError> {
        let endpoint = format!("/trending/{}/{}", scope.path(), window.path());
        let context = match scope {
            TrendingScope::All => None,
            TrendingScope::Movie => Some(MediaKind::Movie),
            TrendingScope::Tv => Some(MediaKind::Tv),
        };
        Ok(self.get_page(&endpoint, context).await?.results)
    }

    async fn popular(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError> {
        let endpoint = format!("/{}/popular?page={}", kind.path(), page);
        self.get_page(&endpoint, Some(kind)).await
    }

    async fn top_rated(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError> {
        let endpoint = format!("/{}/top_rated?page={}", kind.path(), page);
        self.get_page(&endpoint, Some(kind)).await
    }

    async fn new_releases(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError> {
        let endpoint = match kind {
            MediaKind::Movie => format!("/movie/now_playing?page={}", page),
            MediaKind::Tv => format!("/tv/on_the_air?page={}", page),
        };
        self.get_page(&endpoint, Some(kind)).await
    }

    async fn classic(&self, kind: MediaKind) -> Result<Vec<MediaSummary>, TmdbError> {
        self.classic_as_of(ClassicQuery::as_of_today(kind)).await
    }

    async fn discover_by_genre(
        &self,
        kind: MediaKind,
        genre: Option<u32>,
        sort: CatalogSort,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError> {
        let mut endpoint = format!(
            "/discover/{}?sort_by={}&page={}",
            kind.path(),
            sort.discover_sort_by(kind),
            page
        );
        if let Some(genre) = genre {
            endpoint.push_str(&format!("&with_genres={}", genre));
        }
        if sort == CatalogSort::TopRated {
            // Unvoted titles otherwise crowd the top of a rating sort
            endpoint.push_str(&format!("&vote_count.gte={}", TOP_RATED_VOTE_FLOOR));
        }
        self.get_page(&endpoint, Some(kind)).await
    }

    async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, TmdbError> {
        let endpoint = format!("/genre/{}/list", kind.path());
        let response: GenreListResponse = self.get(&endpoint).await?;
        Ok(response
            .genres
            .into_iter()
            .map(|g| Genre { id: g.id, name: g.name })
            .collect())
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError> {
        let endpoint = format!(
            "/search/multi?query={}&page={}",
            urlencoding::encode(query),
            page
        );
        // No context: items without a movie/tv media_type (people) are dropped
        self.get_page(&endpoint, None).await
    }

    async fn detail(&self, kind: MediaKind, id: u64) -> Result<MediaDetail, TmdbError> {
        let endpoint = format!("/{}/{}", kind.path(), id);
        let response: DetailResponse = self.get(&endpoint).await?;
        Ok(response.into_detail(kind))
    }

    async fn credits(&self, kind: MediaKind, id: u64) -> Result<Vec<CastMember>, TmdbError> {
        let endpoint = format!("/{}/{}/credits", kind.path(), id);
        let response: CreditsResponse = self.get(&endpoint).await?;
        Ok(response.into_cast())
    }

    async fn seasons(&self, id: u64) -> Result<Vec<Season>, TmdbError> {
        let detail = self.detail(MediaKind::Tv, id).await?;
        Ok(detail.seasons().to_vec())
    }

    async fn season_episodes(&self, id: u64, season: u32) -> Result<Vec<Episode>, TmdbError> {
        let endpoint = format!("/tv/{}/season/{}", id, season);
        let response: SeasonResponse = self.get(&endpoint).await?;
        Ok(response.into_episodes(season))
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    results: Vec<MediaRaw>,
    #[serde(default)]
    total_pages: u32,
}

impl PageResponse {
    fn into_paged(self, context: Option<MediaKind>) -> PagedResults<MediaSummary> {
        PagedResults {
            results: self
                .results
                .into_iter()
                .filter_map(|r| r.into_summary(context))
                .collect(),
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MediaRaw {
    id: u64,
    media_type: Option<String>,
    // Movies use "title", TV uses "name"
    title: Option<String>,
    name: Option<String>,
    // Movies use "release_date", TV uses "first_air_date"
    release_date: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
}

impl MediaRaw {
    /// Resolve kind and title once. An explicit `media_type` wins over the
    /// caller's context; anything that is neither movie nor tv is dropped.
    fn into_summary(self, context: Option<MediaKind>) -> Option<MediaSummary> {
        let kind = match self.media_type.as_deref() {
            Some(media_type) => MediaKind::from_media_type(media_type)?,
            None => context?,
        };

        let title = non_empty(self.title)
            .or_else(|| non_empty(self.name))
            .unwrap_or_else(|| "Untitled".to_string());
        let release_date = non_empty(self.release_date).or_else(|| non_empty(self.first_air_date));

        Some(MediaSummary {
            id: self.id,
            kind,
            title,
            overview: self.overview.unwrap_or_default(),
            poster_path: non_empty(self.poster_path),
            backdrop_path: non_empty(self.backdrop_path),
            vote_average: self.vote_average,
            release_date,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
    #[serde(default)]
    genres: Vec<GenreRaw>,
    tagline: Option<String>,
    status: Option<String>,
    runtime: Option<u32>,
    number_of_seasons: Option<u32>,
    number_of_episodes: Option<u32>,
    #[serde(default)]
    seasons: Vec<SeasonRaw>,
}

impl DetailResponse {
    fn into_detail(self, kind: MediaKind) -> MediaDetail {
        let extent = match kind {
            MediaKind::Movie => DetailExtent::Movie {
                runtime: self.runtime,
            },
            MediaKind::Tv => DetailExtent::Tv {
                number_of_seasons: self.number_of_seasons,
                number_of_episodes: self.number_of_episodes,
                // Filter out specials (season 0)
                seasons: self
                    .seasons
                    .into_iter()
                    .filter(|s| s.season_number > 0)
                    .map(SeasonRaw::into_season)
                    .collect(),
            },
        };

        let summary = MediaRaw {
            id: self.id,
            media_type: None,
            title: self.title,
            name: self.name,
            release_date: self.release_date,
            first_air_date: self.first_air_date,
            overview: self.overview,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            vote_average: self.vote_average,
        };

        MediaDetail {
            summary: summary.into_summary(Some(kind)).unwrap_or_else(|| MediaSummary {
                id: self.id,
                kind,
                title: "Untitled".to_string(),
                overview: String::new(),
                poster_path: None,
                backdrop_path: None,
                vote_average: None,
                release_date: None,
            }),
            genres: self
                .genres
                .into_iter()
                .map(|g| Genre { id: g.id, name: g.name })
                .collect(),
            tagline: non_empty(self.tagline),
            status: non_empty(self.status),
            extent,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<GenreRaw>,
}

#[derive(Debug, Deserialize)]
struct GenreRaw {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    cast: Vec<CastRaw>,
}

impl CreditsResponse {
    fn into_cast(self) -> Vec<CastMember> {
        self.cast
            .into_iter()
            .take(MAX_CAST_MEMBERS)
            .map(|c| CastMember {
                id: c.id,
                name: c.name,
                character: non_empty(c.character),
                profile_path: non_empty(c.profile_path),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct CastRaw {
    id: u64,
    name: String,
    character: Option<String>,
    profile_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeasonRaw {
    season_number: u32,
    name: Option<String>,
    episode_count: Option<u32>,
    air_date: Option<String>,
}

impl SeasonRaw {
    fn into_season(self) -> Season {
        let season_number = self.season_number;
        Season {
            season_number,
            name: non_empty(self.name).unwrap_or_else(|| format!("Season {}", season_number)),
            episode_count: self.episode_count,
            air_date: non_empty(self.air_date),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeasonResponse {
    #[serde(default)]
    episodes: Vec<EpisodeRaw>,
}

impl SeasonResponse {
    fn into_episodes(self, season: u32) -> Vec<Episode> {
        self.episodes
            .into_iter()
            .map(|e| e.into_episode(season))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct EpisodeRaw {
    episode_number: u32,
    name: Option<String>,
    overview: Option<String>,
    vote_average: Option<f32>,
    still_path: Option<String>,
}

impl EpisodeRaw {
    fn into_episode(self, season: u32) -> Episode {
        let episode_number = self.episode_number;
        Episode {
            season_number: season,
            episode_number,
            name: non_empty(self.name).unwrap_or_else(|| format!("Episode {}", episode_number)),
            overview: self.overview.unwrap_or_default(),
            vote_average: self.vote_average,
            still_path: non_empty(self.still_path),
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}
