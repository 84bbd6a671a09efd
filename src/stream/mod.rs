//! Playback infrastructure
//!
//! - Subtitles: Kurdish subtitle orchestration over the subtitle service
//! - Player: embedded player URL construction

pub mod player;
pub mod subtitles;

pub use player::{PlaybackTarget, PlayerUrl, PlayerUrlBuilder};
pub use subtitles::{SubtitleOrchestrator, SubtitleState};
