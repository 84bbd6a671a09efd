//! Kurdish subtitle orchestration
//!
//! Drives one subtitle request at a time against the subtitle service and
//! keeps the outcome the player needs. The service does the translation work;
//! this side only tracks state.
//!
//! ```text
//! Idle -> Fetching -> Ready | Error
//! ```
//!
//! Ready, Error and Idle all accept a new request. `reset()` returns to Idle.

use serde::Serialize;

use crate::api::subtitles::{SubtitleFetchResponse, SubtitleService, SubtitleTarget};
use crate::app::ViewScope;

/// Fallback message when the service gives none
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch subtitle";

const READY_MESSAGE: &str = "Kurdish subtitle ready";
const CACHED_MESSAGE: &str = "Kurdish subtitle loaded from cache";

/// Label shown by the player for the injected track
pub const SUBTITLE_LABEL: &str = "Kurdish";

/// Orchestrator state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SubtitleState {
    #[default]
    Idle,
    Fetching,
    Ready {
        url: String,
        from_cache: bool,
        message: String,
    },
    Error {
        message: String,
    },
}

impl SubtitleState {
    /// Subtitle artifact URL, only when ready
    pub fn url(&self) -> Option<&str> {
        match self {
            SubtitleState::Ready { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SubtitleState::Ready { message, .. } | SubtitleState::Error { message } => {
                Some(message)
            }
            _ => None,
        }
    }

    pub fn from_cache(&self) -> bool {
        matches!(self, SubtitleState::Ready { from_cache: true, .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SubtitleState::Ready { .. })
    }

    /// Map a service answer to a settled state
    pub fn from_response(response: SubtitleFetchResponse) -> Self {
        match response {
            SubtitleFetchResponse {
                success: true,
                subtitle_url: Some(url),
                from_cache,
                ..
            } => {
                let from_cache = from_cache.unwrap_or(false);
                let message = if from_cache {
                    CACHED_MESSAGE
                } else {
                    READY_MESSAGE
                };
                SubtitleState::Ready {
                    url,
                    from_cache,
                    message: message.to_string(),
                }
            }
            SubtitleFetchResponse { message, .. } => SubtitleState::Error {
                message: message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| FETCH_FAILED_MESSAGE.to_string()),
            },
        }
    }
}

/// Tracks the subtitle for the title currently on screen
pub struct SubtitleOrchestrator<'a> {
    service: &'a dyn SubtitleService,
    state: SubtitleState,
}

impl<'a> SubtitleOrchestrator<'a> {
    pub fn new(service: &'a dyn SubtitleService) -> Self {
        Self {
            service,
            state: SubtitleState::Idle,
        }
    }

    pub fn state(&self) -> &SubtitleState {
        &self.state
    }

    /// Drop any previous outcome; used when the season or episode changes
    pub fn reset(&mut self) {
        if self.state != SubtitleState::Idle {
            tracing::debug!("Subtitle state reset");
        }
        self.state = SubtitleState::Idle;
    }

    /// Request a subtitle for `target` and wait for the outcome
    pub async fn request_subtitle(&mut self, target: SubtitleTarget) -> &SubtitleState {
        self.state = SubtitleState::Fetching;
        let result = self.service.fetch(target).await;
        self.settle(target, result);
        &self.state
    }

    /// Like [`request_subtitle`](Self::request_subtitle), but the answer is
    /// discarded and the state goes back to Idle if `scope` is cancelled first.
    pub async fn request_scoped(
        &mut self,
        target: SubtitleTarget,
        scope: &ViewScope,
    ) -> &SubtitleState {
        self.state = SubtitleState::Fetching;
        match scope.run(self.service.fetch(target)).await {
            Some(result) => self.settle(target, result),
            None => {
                tracing::debug!(?target, "Subtitle request abandoned");
                self.state = SubtitleState::Idle;
            }
        }
        &self.state
    }

    fn settle<E: std::fmt::Display>(
        &mut self,
        target: SubtitleTarget,
        result: Result<SubtitleFetchResponse, E>,
    ) {
        self.state = match result {
            Ok(response) => SubtitleState::from_response(response),
            Err(e) => {
                tracing::warn!(?target, error = %e, "Subtitle request failed");
                SubtitleState::Error {
                    message: FETCH_FAILED_MESSAGE.to_string(),
                }
            }
        };

        match &self.state {
            SubtitleState::Ready { from_cache, .. } => {
                tracing::info!(?target, from_cache, "Subtitle ready");
            }
            SubtitleState::Error { message } => {
                tracing::debug!(?target, message, "Subtitle unavailable");
            }
            _ => {}
        }
    }
}
