//! Page and sort state shared by the list views
//!
//! One [`Paginator`] drives search results, the genre-filtered movie list and
//! the TV catalog. The mode type `M` is whatever selects the result set: the
//! query text, a sort mode or a genre filter.
//!
//! States: idle (no query) -> loading -> loaded | empty | error.

use async_trait::async_trait;
use std::fmt;

use crate::api::tmdb::{Catalog, TmdbError};
use crate::app::ViewScope;
use crate::models::{CatalogSort, MediaKind, MediaSummary, PagedResults, MAX_TOTAL_PAGES};

/// List view status
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageStatus {
    /// Nothing to show yet (e.g. blank search)
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Fetch succeeded with zero results
    Empty,
    Error(String),
}

/// A fetch the paginator wants dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<M> {
    pub mode: M,
    pub page: u32,
    generation: u64,
}

/// Source of result pages for a mode
#[async_trait]
pub trait PageSource<M: Send + Sync>: Send + Sync {
    async fn fetch_page(
        &self,
        mode: &M,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError>;
}

/// Page/sort state machine
#[derive(Debug, Clone)]
pub struct Paginator<M> {
    mode: Option<M>,
    current_page: u32,
    total_pages: u32,
    status: PageStatus,
    results: Vec<MediaSummary>,
    generation: u64,
    scroll_to_top: bool,
}

impl<M> Default for Paginator<M> {
    fn default() -> Self {
        Self {
            mode: None,
            current_page: 1,
            total_pages: 1,
            status: PageStatus::Idle,
            results: Vec::new(),
            generation: 0,
            scroll_to_top: false,
        }
    }
}

impl<M: Clone + PartialEq + fmt::Debug> Paginator<M> {
    /// Idle paginator with no mode selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Paginator already loading page 1 of `mode`
    pub fn with_mode(mode: M) -> Self {
        let mut paginator = Self::new();
        paginator.set_mode(mode);
        paginator
    }

    pub fn mode(&self) -> Option<&M> {
        self.mode.as_ref()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn status(&self) -> &PageStatus {
        &self.status
    }

    pub fn results(&self) -> &[MediaSummary] {
        &self.results
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Switch query/sort/filter. Resets to page 1 and starts loading.
    /// Selecting the active mode again is a no-op.
    pub fn set_mode(&mut self, mode: M) -> bool {
        if self.mode.as_ref() == Some(&mode) {
            return false;
        }
        tracing::debug!(?mode, "List mode changed");
        self.mode = Some(mode);
        self.current_page = 1;
        self.total_pages = 1;
        self.begin_loading();
        true
    }

    /// Drop the mode and return to idle
    pub fn clear(&mut self) {
        self.mode = None;
        self.current_page = 1;
        self.total_pages = 1;
        self.results.clear();
        self.status = PageStatus::Idle;
        // Supersede anything in flight
        self.generation += 1;
    }

    /// Jump to page `n`. No-op unless a mode is set and `1 <= n <= total_pages`;
    /// there is no wraparound. Re-selecting the current page is also a no-op.
    pub fn go_to_page(&mut self, n: u32) -> bool {
        if self.mode.is_none() || n < 1 || n > self.total_pages || n == self.current_page {
            return false;
        }
        self.current_page = n;
        self.begin_loading();
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    /// Consume the pending scroll-to-top request raised by a page change
    pub fn take_scroll_to_top(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_top)
    }

    /// The fetch to dispatch, if loading
    pub fn request(&self) -> Option<PageRequest<M>> {
        match (&self.status, &self.mode) {
            (PageStatus::Loading, Some(mode)) => Some(PageRequest {
                mode: mode.clone(),
                page: self.current_page,
                generation: self.generation,
            }),
            _ => None,
        }
    }

    /// Record the outcome of `request`. Results for superseded requests are
    /// ignored; returns whether the state changed.
    pub fn apply(
        &mut self,
        request: &PageRequest<M>,
        result: Result<PagedResults<MediaSummary>, TmdbError>,
    ) -> bool {
        if request.generation != self.generation || self.status != PageStatus::Loading {
            tracing::debug!(page = request.page, "Discarding stale page result");
            return false;
        }

        match result {
            Ok(page) => {
                // Never advertise pages past the upstream ceiling, and keep
                // the current page inside the range
                self.total_pages = page
                    .total_pages
                    .min(MAX_TOTAL_PAGES)
                    .max(self.current_page)
                    .max(1);
                self.results = page.results;
                self.status = if self.results.is_empty() {
                    PageStatus::Empty
                } else {
                    PageStatus::Loaded
                };
            }
            Err(e) => {
                tracing::warn!(page = request.page, error = %e, "Page fetch failed");
                self.results.clear();
                self.status = PageStatus::Error(e.to_string());
            }
        }
        true
    }

    /// Fetch the pending request from `source`, unless the view goes away
    pub async fn load<S>(&mut self, source: &S, scope: &ViewScope) -> bool
    where
        S: PageSource<M> + ?Sized,
        M: Send + Sync,
    {
        let Some(request) = self.request() else {
            return false;
        };
        match scope
            .run(source.fetch_page(&request.mode, request.page))
            .await
        {
            Some(result) => self.apply(&request, result),
            None => false,
        }
    }

    fn begin_loading(&mut self) {
        self.generation += 1;
        self.status = PageStatus::Loading;
        self.scroll_to_top = true;
    }
}

impl Paginator<String> {
    /// Set the search text; blank text returns to idle
    pub fn set_query(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            let was_active = self.mode.is_some();
            self.clear();
            return was_active;
        }
        self.set_mode(query.to_string())
    }
}

// =============================================================================
// Sources
// =============================================================================

/// Multi-search results, mode = query text
pub struct SearchSource<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> SearchSource<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl<'a> PageSource<String> for SearchSource<'a> {
    async fn fetch_page(
        &self,
        mode: &String,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError> {
        self.catalog.search(mode, page).await
    }
}

/// TV catalog, mode = sort
pub struct TvCatalogSource<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> TvCatalogSource<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl<'a> PageSource<CatalogSort> for TvCatalogSource<'a> {
    async fn fetch_page(
        &self,
        mode: &CatalogSort,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError> {
        match mode {
            CatalogSort::Popular => self.catalog.popular(MediaKind::Tv, page).await,
            CatalogSort::TopRated => self.catalog.top_rated(MediaKind::Tv, page).await,
            CatalogSort::Newest => self.catalog.new_releases(MediaKind::Tv, page).await,
        }
    }
}

/// Genre filter and sort for discover lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenreFilter {
    pub genre: Option<u32>,
    pub sort: CatalogSort,
}

/// Genre-filtered list of one kind, mode = [`GenreFilter`]
pub struct GenreListSource<'a> {
    catalog: &'a dyn Catalog,
    kind: MediaKind,
}

impl<'a> GenreListSource<'a> {
    pub fn new(catalog: &'a dyn Catalog, kind: MediaKind) -> Self {
        Self { catalog, kind }
    }
}

#[async_trait]
impl<'a> PageSource<GenreFilter> for GenreListSource<'a> {
    async fn fetch_page(
        &self,
        mode: &GenreFilter,
        page: u32,
    ) -> Result<PagedResults<MediaSummary>, TmdbError> {
        self.catalog
            .discover_by_genre(self.kind, mode.genre, mode.sort, page)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64) -> MediaSummary {
        MediaSummary {
            id,
            kind: MediaKind::Tv,
            title: format!("Show {}", id),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            vote_average: Some(7.0),
            release_date: None,
        }
    }

    fn page(n: usize, total_pages: u32) -> PagedResults<MediaSummary> {
        PagedResults {
            results: (0..n as u64).map(item).collect(),
            total_pages,
        }
    }

    fn loaded(total_pages: u32) -> Paginator<CatalogSort> {
        let mut p = Paginator::with_mode(CatalogSort::Popular);
        let req = p.request().unwrap();
        assert!(p.apply(&req, Ok(page(20, total_pages))));
        p.take_scroll_to_top();
        p
    }

    #[test]
    fn test_starts_idle() {
        let p: Paginator<String> = Paginator::new();
        assert_eq!(p.status(), &PageStatus::Idle);
        assert!(p.request().is_none());
    }

    #[test]
    fn test_total_pages_clamped() {
        let p = loaded(36_000);
        assert_eq!(p.total_pages(), MAX_TOTAL_PAGES);
        assert_eq!(p.status(), &PageStatus::Loaded);
    }

    #[test]
    fn test_out_of_range_pages_are_noops() {
        let mut p = loaded(5);
        for n in [0, 6, 501, u32::MAX] {
            assert!(!p.go_to_page(n));
            assert_eq!(p.current_page(), 1);
            assert_eq!(p.status(), &PageStatus::Loaded);
            assert!(!p.take_scroll_to_top());
        }
        assert!(!p.prev_page());
    }

    #[test]
    fn test_page_change_loads_and_scrolls() {
        let mut p = loaded(5);
        assert!(p.go_to_page(5));
        assert_eq!(p.status(), &PageStatus::Loading);
        assert!(p.take_scroll_to_top());
        assert!(!p.take_scroll_to_top());
        assert_eq!(p.request().unwrap().page, 5);
    }

    #[test]
    fn test_mode_change_resets_page() {
        let mut p = loaded(5);
        p.go_to_page(3);
        let req = p.request().unwrap();
        p.apply(&req, Ok(page(20, 5)));

        assert!(p.set_mode(CatalogSort::TopRated));
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.request().unwrap().mode, CatalogSort::TopRated);

        // Same mode again changes nothing
        assert!(!p.set_mode(CatalogSort::TopRated));
    }

    #[test]
    fn test_zero_results_is_empty() {
        let mut p: Paginator<String> = Paginator::new();
        p.set_query("zzzzqqq");
        let req = p.request().unwrap();
        p.apply(&req, Ok(PagedResults::empty()));
        assert_eq!(p.status(), &PageStatus::Empty);
        assert_eq!(p.total_pages(), 1);
    }

    #[test]
    fn test_error_state() {
        let mut p = Paginator::with_mode(CatalogSort::Newest);
        let req = p.request().unwrap();
        p.apply(
            &req,
            Err(TmdbError::Status {
                code: 503,
                reason: "Service Unavailable".into(),
            }),
        );
        assert!(matches!(p.status(), PageStatus::Error(msg) if msg.contains("503")));
        assert!(p.results().is_empty());
    }

    #[test]
    fn test_stale_result_ignored() {
        let mut p: Paginator<String> = Paginator::new();
        p.set_query("alien");
        let stale = p.request().unwrap();
        p.set_query("aliens");
        let fresh = p.request().unwrap();

        assert!(!p.apply(&stale, Ok(page(3, 1))));
        assert_eq!(p.status(), &PageStatus::Loading);

        assert!(p.apply(&fresh, Ok(page(2, 1))));
        assert_eq!(p.results().len(), 2);
    }

    #[test]
    fn test_blank_query_goes_idle() {
        let mut p: Paginator<String> = Paginator::new();
        p.set_query("dune");
        assert!(p.set_query("   "));
        assert_eq!(p.status(), &PageStatus::Idle);
        assert!(p.mode().is_none());
        assert!(!p.go_to_page(1));
    }
}
