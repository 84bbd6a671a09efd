//! Watch page controller
//!
//! Movies are playable as soon as the session exists. TV sessions load the
//! season list, then the first season's episodes, and select the first of
//! each. Changing season or episode drops any fetched subtitle, since it
//! belongs to the previous episode.

use crate::api::subtitles::{SubtitleService, SubtitleTarget};
use crate::api::tmdb::{Catalog, TmdbError};
use crate::app::ViewScope;
use crate::models::{Episode, MediaKind, Season};
use crate::stream::player::{PlaybackTarget, PlayerUrl, PlayerUrlBuilder};
use crate::stream::subtitles::{SubtitleOrchestrator, SubtitleState};

pub struct WatchSession<'a> {
    catalog: &'a dyn Catalog,
    subtitles: SubtitleOrchestrator<'a>,
    player: PlayerUrlBuilder,
    kind: MediaKind,
    id: u64,
    seasons: Vec<Season>,
    episodes: Vec<Episode>,
    season: Option<u32>,
    episode: Option<u32>,
}

impl<'a> WatchSession<'a> {
    pub fn new(
        catalog: &'a dyn Catalog,
        subtitles: &'a dyn SubtitleService,
        player: PlayerUrlBuilder,
        kind: MediaKind,
        id: u64,
    ) -> Self {
        Self {
            catalog,
            subtitles: SubtitleOrchestrator::new(subtitles),
            player,
            kind,
            id,
            seasons: Vec::new(),
            episodes: Vec::new(),
            season: None,
            episode: None,
        }
    }

    /// Load seasons and episodes for TV; no-op for movies
    pub async fn load(&mut self) -> Result<(), TmdbError> {
        if self.kind == MediaKind::Movie {
            return Ok(());
        }

        self.seasons = self.catalog.seasons(self.id).await?;
        tracing::debug!(id = self.id, seasons = self.seasons.len(), "Seasons loaded");

        match self.seasons.first().map(|s| s.season_number) {
            Some(first) => self.load_season(first).await,
            None => {
                self.season = None;
                self.episodes.clear();
                self.episode = None;
                Ok(())
            }
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn selected_season(&self) -> Option<u32> {
        self.season
    }

    pub fn selected_episode(&self) -> Option<u32> {
        self.episode
    }

    pub fn subtitle_state(&self) -> &SubtitleState {
        self.subtitles.state()
    }

    /// Switch season: refetch its episodes, select the first, drop the subtitle.
    /// Returns `Ok(false)` for a season the show doesn't have; the current
    /// season is left as is.
    pub async fn select_season(&mut self, season_number: u32) -> Result<bool, TmdbError> {
        if !self.seasons.iter().any(|s| s.season_number == season_number) {
            return Ok(false);
        }
        if self.season == Some(season_number) {
            return Ok(true);
        }
        self.load_season(season_number).await?;
        Ok(true)
    }

    /// Switch episode within the current season and drop the subtitle.
    /// Re-selecting the current episode keeps it.
    pub fn select_episode(&mut self, episode_number: u32) -> bool {
        if !self
            .episodes
            .iter()
            .any(|e| e.episode_number == episode_number)
        {
            return false;
        }
        if self.episode == Some(episode_number) {
            return true;
        }
        self.episode = Some(episode_number);
        self.subtitles.reset();
        true
    }

    /// Current playback target; `None` for a TV show with nothing selected
    pub fn target(&self) -> Option<PlaybackTarget> {
        match self.kind {
            MediaKind::Movie => Some(PlaybackTarget::Movie { id: self.id }),
            MediaKind::Tv => Some(PlaybackTarget::Episode {
                id: self.id,
                season: self.season?,
                episode: self.episode?,
            }),
        }
    }

    pub fn subtitle_target(&self) -> Option<SubtitleTarget> {
        Some(match self.target()? {
            PlaybackTarget::Movie { id } => SubtitleTarget::Movie { tmdb_id: id },
            PlaybackTarget::Episode {
                id,
                season,
                episode,
            } => SubtitleTarget::Tv {
                tmdb_id: id,
                season,
                episode,
            },
        })
    }

    /// Ask the subtitle service for the current target
    pub async fn fetch_subtitle(&mut self, scope: &ViewScope) -> Option<&SubtitleState> {
        let target = self.subtitle_target()?;
        Some(self.subtitles.request_scoped(target, scope).await)
    }

    /// Player URL, carrying the subtitle only if asked and one is ready
    pub fn player_url(&self, with_subtitle: bool) -> Option<PlayerUrl> {
        let target = self.target()?;
        Some(if with_subtitle {
            self.player.build(target, self.subtitles.state())
        } else {
            self.player.build_plain(target)
        })
    }

    async fn load_season(&mut self, season_number: u32) -> Result<(), TmdbError> {
        self.subtitles.reset();
        self.season = Some(season_number);
        self.episode = None;
        self.episodes.clear();

        self.episodes = self
            .catalog
            .season_episodes(self.id, season_number)
            .await?;
        self.episode = self.episodes.first().map(|e| e.episode_number);

        tracing::debug!(
            id = self.id,
            season = season_number,
            episodes = self.episodes.len(),
            "Season selected"
        );
        Ok(())
    }
}
