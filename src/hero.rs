//! Hero banner rotation
//!
//! [`HeroRotator`] owns a periodic task that advances the hero cursor every
//! [`HERO_INTERVAL`]. The task is tied to the owning view's scope and is torn
//! down when the rotator is stopped, dropped, or the view is left.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::app::ViewScope;
use crate::models::{MediaSummary, HERO_INTERVAL, HERO_WINDOW};

// ---------------------------------------------------------------------------
// HeroSelection
// ---------------------------------------------------------------------------

/// Fixed window of hero candidates plus the rotation cursor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeroSelection {
    items: Vec<MediaSummary>,
    cursor: usize,
}

impl HeroSelection {
    /// Take at most [`HERO_WINDOW`] candidates, in order
    pub fn new(mut items: Vec<MediaSummary>) -> Self {
        items.truncate(HERO_WINDOW);
        Self { items, cursor: 0 }
    }

    pub fn items(&self) -> &[MediaSummary] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&MediaSummary> {
        self.items.get(self.cursor)
    }

    /// Move to the next candidate, wrapping around
    pub fn advance(&mut self) -> usize {
        if !self.items.is_empty() {
            self.cursor = (self.cursor + 1) % self.items.len();
        }
        self.cursor
    }

    /// Jump to candidate `index`; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.items.len() || index == self.cursor {
            return false;
        }
        self.cursor = index;
        true
    }
}

// ---------------------------------------------------------------------------
// HeroRotator
// ---------------------------------------------------------------------------

/// Timer-driven rotation over a [`HeroSelection`]
///
/// Manual selection moves the cursor immediately and leaves the timer alone,
/// so the next tick continues from the selected item.
pub struct HeroRotator {
    state: Arc<watch::Sender<HeroSelection>>,
    period: Duration,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl HeroRotator {
    /// Rotator bound to `scope`; leaving the view stops it
    pub fn new(selection: HeroSelection, scope: &ViewScope) -> Self {
        Self::with_period(selection, scope, HERO_INTERVAL)
    }

    pub fn with_period(selection: HeroSelection, scope: &ViewScope, period: Duration) -> Self {
        let (tx, _rx) = watch::channel(selection);
        Self {
            state: Arc::new(tx),
            period,
            cancel: scope.token().child_token(),
            task: None,
        }
    }

    /// Spawn the rotation task. Does nothing for an empty window, a stopped
    /// rotator, or when already running.
    pub fn start(&mut self) -> bool {
        if self.task.is_some() || self.cancel.is_cancelled() || self.state.borrow().is_empty() {
            return false;
        }

        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();
        let period = self.period;

        self.task = Some(tokio::spawn(async move {
            // First tick one full period after start
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("Hero rotation stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        state.send_modify(|selection| {
                            let cursor = selection.advance();
                            tracing::trace!(cursor, "Hero advanced");
                        });
                    }
                }
            }
        }));
        true
    }

    /// Tear the timer down
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished()) && !self.cancel.is_cancelled()
    }

    /// Manual override from an indicator click
    pub fn select(&self, index: usize) -> bool {
        self.state.send_if_modified(|selection| selection.select(index))
    }

    pub fn cursor(&self) -> usize {
        self.state.borrow().cursor()
    }

    pub fn current(&self) -> Option<MediaSummary> {
        self.state.borrow().current().cloned()
    }

    pub fn selection(&self) -> HeroSelection {
        self.state.borrow().clone()
    }

    /// Receive every cursor change
    pub fn subscribe(&self) -> watch::Receiver<HeroSelection> {
        self.state.subscribe()
    }
}

impl Drop for HeroRotator {
    fn drop(&mut self) {
        self.stop();
    }
}
