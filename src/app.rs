//! App state and view lifecycle
//!
//! Manages the navigation stack and the lifetime of each active view.
//! Every view instance owns a [`ViewScope`]; leaving the view cancels the
//! scope, which aborts the view's in-flight loads and stops its timers.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::MediaKind;

// =============================================================================
// View Enum
// =============================================================================

/// Page the user is currently on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    /// Landing page: hero banner and shelves
    #[default]
    Home,
    /// Search results for a query
    Search,
    /// Movies, optionally filtered by genre
    Movies,
    /// TV catalog
    TvShows,
    /// Detail page for a movie or TV show
    Details { kind: MediaKind, id: u64 },
    /// Playback page
    Watch { kind: MediaKind, id: u64 },
}

// =============================================================================
// View Scope
// =============================================================================

/// Lifetime of one view instance
///
/// Cloning shares the same cancellation token.
#[derive(Debug, Clone)]
pub struct ViewScope {
    id: Uuid,
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            token: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Token cancelled when the view goes away
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn cancel(&self) {
        if self.is_active() {
            tracing::debug!(view = %self.id, "View scope cancelled");
        }
        self.token.cancel();
    }

    /// Run `fut` unless the view is left first; `None` means the result was
    /// discarded because the view is gone.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            _ = self.token.cancelled() => None,
            out = fut => {
                if self.is_active() {
                    Some(out)
                } else {
                    None
                }
            }
        }
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Main Application State
// =============================================================================

/// Navigation stack with one scope per live view
#[derive(Debug)]
pub struct App {
    /// Current view
    pub view: View,
    /// Navigation history stack
    pub nav_stack: Vec<View>,
    /// Display name from configuration
    pub display_name: String,
    scope: ViewScope,
}

impl Default for App {
    fn default() -> Self {
        Self::new("Movie Database")
    }
}

impl App {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            view: View::Home,
            nav_stack: Vec::new(),
            display_name: display_name.into(),
            scope: ViewScope::new(),
        }
    }

    /// Scope of the current view instance
    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Navigate to a new view, pushing current to stack
    ///
    /// Returns the scope of the new view instance.
    pub fn navigate(&mut self, view: View) -> ViewScope {
        // Don't push if going to same view
        if self.view != view {
            let prev = std::mem::replace(&mut self.view, view);
            self.nav_stack.push(prev);
            self.replace_scope();
        }
        self.scope.clone()
    }

    /// Go back to previous view
    pub fn back(&mut self) -> bool {
        if let Some(prev) = self.nav_stack.pop() {
            self.view = prev;
            self.replace_scope();
            true
        } else {
            false
        }
    }

    /// Cancel the current view's scope; used on shutdown
    pub fn close(&mut self) {
        self.scope.cancel();
    }

    fn replace_scope(&mut self) {
        let old = std::mem::replace(&mut self.scope, ViewScope::new());
        old.cancel();
        tracing::debug!(view = ?self.view, scope = %self.scope.id(), "Entered view");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
