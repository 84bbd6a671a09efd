//! Embedded player URL
//!
//! Builds the provider URL that plays a movie or a TV episode, with the
//! fixed theme parameters and, when one is ready, the Kurdish subtitle track.

use std::fmt;

use crate::config::Config;
use crate::models::MediaKind;
use crate::stream::subtitles::{SubtitleState, SUBTITLE_LABEL};

/// What to play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTarget {
    Movie { id: u64 },
    Episode { id: u64, season: u32, episode: u32 },
}

impl PlaybackTarget {
    pub fn kind(&self) -> MediaKind {
        match self {
            PlaybackTarget::Movie { .. } => MediaKind::Movie,
            PlaybackTarget::Episode { .. } => MediaKind::Tv,
        }
    }

    fn path(&self) -> String {
        match self {
            PlaybackTarget::Movie { id } => format!("/movie/{}", id),
            PlaybackTarget::Episode {
                id,
                season,
                episode,
            } => format!("/tv/{}/{}/{}", id, season, episode),
        }
    }
}

/// Player look and behaviour flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTheme {
    /// Hex colours without the leading '#'
    pub primary_color: String,
    pub secondary_color: String,
    pub icon_color: String,
    pub icons: String,
    pub player: String,
    pub autoplay: bool,
}

impl Default for PlayerTheme {
    fn default() -> Self {
        Self {
            primary_color: "E50914".to_string(),
            secondary_color: "170000".to_string(),
            icon_color: "FFFFFF".to_string(),
            icons: "default".to_string(),
            player: "default".to_string(),
            autoplay: false,
        }
    }
}

/// Builds [`PlayerUrl`]s against one provider
#[derive(Debug, Clone)]
pub struct PlayerUrlBuilder {
    base_url: String,
    theme: PlayerTheme,
}

impl PlayerUrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            theme: PlayerTheme::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.player_base_url.clone())
    }

    pub fn with_theme(mut self, theme: PlayerTheme) -> Self {
        self.theme = theme;
        self
    }

    /// URL carrying the subtitle only if `subtitle` is Ready
    pub fn build(&self, target: PlaybackTarget, subtitle: &SubtitleState) -> PlayerUrl {
        PlayerUrl {
            url: self.render(target, subtitle.url()),
            target,
            subtitle_url: subtitle.url().map(str::to_string),
        }
    }

    /// URL for "play without subtitle"
    pub fn build_plain(&self, target: PlaybackTarget) -> PlayerUrl {
        self.build(target, &SubtitleState::Idle)
    }

    fn render(&self, target: PlaybackTarget, subtitle: Option<&str>) -> String {
        let theme = &self.theme;
        let mut url = format!(
            "{}{}?primaryColor={}&secondaryColor={}&iconColor={}&icons={}&player={}\
             &title=true&poster=true&autoplay={}&nextbutton=false",
            self.base_url,
            target.path(),
            theme.primary_color,
            theme.secondary_color,
            theme.icon_color,
            theme.icons,
            theme.player,
            theme.autoplay,
        );

        if let Some(sub) = subtitle {
            url.push_str(&format!(
                "&sub_file={}&sub_label={}",
                urlencoding::encode(sub),
                SUBTITLE_LABEL
            ));
        }
        url
    }
}

/// Fully built player URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerUrl {
    pub url: String,
    pub target: PlaybackTarget,
    pub subtitle_url: Option<String>,
}

impl PlayerUrl {
    pub fn has_subtitle(&self) -> bool {
        self.subtitle_url.is_some()
    }
}

impl fmt::Display for PlayerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
