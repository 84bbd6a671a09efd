//! Landing page aggregation
//!
//! Fans out the five landing queries concurrently and tracks each shelf's
//! outcome on its own, so one failing query blanks only its own shelf. The
//! trending feed supplies both the hero candidates and the "Trending Now"
//! shelf. [`load_home_into`] publishes every part as soon as it settles.

use std::future::Future;

use serde::Serialize;
use tokio::sync::watch;

use crate::api::tmdb::{Catalog, TmdbError};
use crate::app::ViewScope;
use crate::hero::HeroSelection;
use crate::models::{MediaKind, MediaSummary, TimeWindow, TrendingScope, TRENDING_SHELF_END};

/// Outcome of one shelf (or the hero) load
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum ShelfResult<T> {
    #[default]
    Pending,
    Loaded(T),
    Failed(String),
}

impl<T> ShelfResult<T> {
    pub fn from_result(result: Result<T, TmdbError>) -> Self {
        match result {
            Ok(value) => ShelfResult::Loaded(value),
            Err(e) => ShelfResult::Failed(e.to_string()),
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            ShelfResult::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ShelfResult::Failed(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ShelfResult::Pending)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ShelfResult<U> {
        match self {
            ShelfResult::Pending => ShelfResult::Pending,
            ShelfResult::Loaded(value) => ShelfResult::Loaded(f(value)),
            ShelfResult::Failed(msg) => ShelfResult::Failed(msg),
        }
    }
}

/// Landing page shelves, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelfId {
    Trending,
    NewTv,
    NewMovies,
    ClassicMovies,
    ClassicTv,
}

impl ShelfId {
    pub const ALL: [ShelfId; 5] = [
        ShelfId::Trending,
        ShelfId::NewTv,
        ShelfId::NewMovies,
        ShelfId::ClassicMovies,
        ShelfId::ClassicTv,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ShelfId::Trending => "Trending Now",
            ShelfId::NewTv => "New TV Shows",
            ShelfId::NewMovies => "New Movies",
            ShelfId::ClassicMovies => "Classic Movies",
            ShelfId::ClassicTv => "Classic TV Shows",
        }
    }

    /// Kind of every item on the shelf; `None` for mixed shelves
    pub fn kind(&self) -> Option<MediaKind> {
        match self {
            ShelfId::Trending => None,
            ShelfId::NewTv | ShelfId::ClassicTv => Some(MediaKind::Tv),
            ShelfId::NewMovies | ShelfId::ClassicMovies => Some(MediaKind::Movie),
        }
    }
}

/// Titled, horizontally scrolled list of items
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shelf {
    pub id: ShelfId,
    pub title: &'static str,
    pub kind: Option<MediaKind>,
    pub items: ShelfResult<Vec<MediaSummary>>,
}

impl Shelf {
    pub fn pending(id: ShelfId) -> Self {
        Self {
            id,
            title: id.title(),
            kind: id.kind(),
            items: ShelfResult::Pending,
        }
    }
}

/// Landing view model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeFeed {
    pub hero: ShelfResult<Vec<MediaSummary>>,
    pub shelves: Vec<Shelf>,
}

impl Default for HomeFeed {
    fn default() -> Self {
        Self {
            hero: ShelfResult::Pending,
            shelves: ShelfId::ALL.into_iter().map(Shelf::pending).collect(),
        }
    }
}

impl HomeFeed {
    /// Hero window ready for a [`crate::hero::HeroRotator`]
    pub fn hero_selection(&self) -> HeroSelection {
        HeroSelection::new(self.hero.loaded().cloned().unwrap_or_default())
    }

    pub fn shelf(&self, id: ShelfId) -> Option<&Shelf> {
        self.shelves.iter().find(|s| s.id == id)
    }

    /// Shelves that loaded, in display order
    pub fn visible_shelves(&self) -> impl Iterator<Item = &Shelf> {
        self.shelves.iter().filter(|s| s.items.loaded().is_some())
    }

    /// `(title, message)` of every failed shelf
    pub fn failures(&self) -> Vec<(&'static str, &str)> {
        self.shelves
            .iter()
            .filter_map(|s| match &s.items {
                ShelfResult::Failed(msg) => Some((s.title, msg.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Hero and every shelf failed: nothing to show at all
    pub fn all_failed(&self) -> bool {
        self.hero.is_failed() && self.shelves.iter().all(|s| s.items.is_failed())
    }

    /// No part is still loading
    pub fn is_settled(&self) -> bool {
        !self.hero.is_pending() && self.shelves.iter().all(|s| !s.items.is_pending())
    }

    /// Settle the hero and the Trending shelf from the trending feed
    pub fn set_trending(&mut self, trending: Result<Vec<MediaSummary>, TmdbError>) {
        let trending = ShelfResult::from_result(trending);
        self.hero = trending.clone().map(|items| hero_candidates(&items));
        self.set_shelf(ShelfId::Trending, trending.map(|items| trending_shelf(&items)));
    }

    pub fn set_shelf(&mut self, id: ShelfId, items: ShelfResult<Vec<MediaSummary>>) {
        if let Some(shelf) = self.shelves.iter_mut().find(|s| s.id == id) {
            shelf.items = items;
        }
    }

    /// Build the feed from the five settled queries
    pub fn from_results(
        trending: Result<Vec<MediaSummary>, TmdbError>,
        new_tv: Result<Vec<MediaSummary>, TmdbError>,
        new_movies: Result<Vec<MediaSummary>, TmdbError>,
        classic_movies: Result<Vec<MediaSummary>, TmdbError>,
        classic_tv: Result<Vec<MediaSummary>, TmdbError>,
    ) -> Self {
        let mut feed = Self::default();
        feed.set_trending(trending);
        feed.set_shelf(ShelfId::NewTv, ShelfResult::from_result(new_tv));
        feed.set_shelf(ShelfId::NewMovies, ShelfResult::from_result(new_movies));
        feed.set_shelf(ShelfId::ClassicMovies, ShelfResult::from_result(classic_movies));
        feed.set_shelf(ShelfId::ClassicTv, ShelfResult::from_result(classic_tv));
        feed
    }
}

/// First [`crate::models::HERO_WINDOW`] trending items
pub fn hero_candidates(trending: &[MediaSummary]) -> Vec<MediaSummary> {
    HeroSelection::new(trending.to_vec()).items().to_vec()
}

/// Trending items 1..20; item 0 is already the hero
pub fn trending_shelf(trending: &[MediaSummary]) -> Vec<MediaSummary> {
    trending
        .iter()
        .skip(1)
        .take(TRENDING_SHELF_END - 1)
        .cloned()
        .collect()
}

/// Load the landing page into `feed`. All five queries run concurrently and
/// each part is published the moment its query settles, so a slow shelf never
/// holds back the hero. Returns `false` if the view was left first; `feed`
/// then keeps whatever had settled.
pub async fn load_home_into(
    catalog: &dyn Catalog,
    scope: &ViewScope,
    feed: &watch::Sender<HomeFeed>,
) -> bool {
    let trending = async {
        let result = catalog.trending(TrendingScope::All, TimeWindow::Week).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Trending failed to load");
        }
        feed.send_modify(|f| f.set_trending(result));
    };

    let fetch = async {
        tokio::join!(
            trending,
            publish(feed, ShelfId::NewTv, async {
                catalog
                    .new_releases(MediaKind::Tv, 1)
                    .await
                    .map(|p| p.results)
            }),
            publish(feed, ShelfId::NewMovies, async {
                catalog
                    .new_releases(MediaKind::Movie, 1)
                    .await
                    .map(|p| p.results)
            }),
            publish(feed, ShelfId::ClassicMovies, catalog.classic(MediaKind::Movie)),
            publish(feed, ShelfId::ClassicTv, catalog.classic(MediaKind::Tv)),
        )
    };

    scope.run(fetch).await.is_some()
}

async fn publish<F>(feed: &watch::Sender<HomeFeed>, id: ShelfId, fetch: F)
where
    F: Future<Output = Result<Vec<MediaSummary>, TmdbError>>,
{
    let result = fetch.await;
    if let Err(e) = &result {
        tracing::warn!(shelf = id.title(), error = %e, "Shelf failed to load");
    }
    feed.send_modify(|f| f.set_shelf(id, ShelfResult::from_result(result)));
}

/// Load the landing page and return it once every part has settled.
/// Returns `None` if the view was left before that.
pub async fn load_home(catalog: &dyn Catalog, scope: &ViewScope) -> Option<HomeFeed> {
    let (tx, _rx) = watch::channel(HomeFeed::default());
    if !load_home_into(catalog, scope, &tx).await {
        return None;
    }

    let feed = tx.borrow().clone();
    tracing::debug!(
        shelves = feed.visible_shelves().count(),
        hero = feed.hero.loaded().map(Vec::len).unwrap_or(0),
        "Home feed loaded"
    );
    Some(feed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use crate::models::{CastMember, CatalogSort, Episode, Genre, MediaDetail, PagedResults, Season};

    fn items(n: u64) -> Vec<MediaSummary> {
        (0..n)
            .map(|id| MediaSummary {
                id,
                kind: MediaKind::Movie,
                title: format!("Item {}", id),
                overview: String::new(),
                poster_path: None,
                backdrop_path: None,
                vote_average: None,
                release_date: None,
            })
            .collect()
    }

    fn ids(items: &[MediaSummary]) -> Vec<u64> {
        items.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_trending_shelf_skips_hero_item() {
        let shelf = trending_shelf(&items(25));
        assert_eq!(ids(&shelf), (1..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_trending_shelf_short_feed() {
        assert_eq!(ids(&trending_shelf(&items(3))), vec![1, 2]);
        assert!(trending_shelf(&[]).is_empty());
    }

    #[test]
    fn test_hero_candidates() {
        assert_eq!(ids(&hero_candidates(&items(25))), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_shelf_failure_is_isolated() {
        let feed = HomeFeed::from_results(
            Ok(items(20)),
            Err(TmdbError::NotFound),
            Ok(items(5)),
            Ok(items(5)),
            Ok(items(5)),
        );

        assert_eq!(feed.hero.loaded().map(Vec::len), Some(10));
        assert!(feed.shelf(ShelfId::NewTv).unwrap().items.is_failed());
        assert_eq!(feed.visible_shelves().count(), 4);
        assert_eq!(feed.failures().len(), 1);
        assert!(!feed.all_failed());
    }

    #[test]
    fn test_trending_failure_blanks_hero_only() {
        let feed = HomeFeed::from_results(
            Err(TmdbError::NotFound),
            Ok(items(5)),
            Ok(items(5)),
            Ok(items(5)),
            Ok(items(5)),
        );
        assert!(feed.hero.is_failed());
        assert!(feed.shelf(ShelfId::Trending).unwrap().items.is_failed());
        assert!(feed.hero_selection().is_empty());
        assert_eq!(feed.visible_shelves().count(), 4);
    }

    /// Trending answers at once; the classic TV query takes 30 s
    struct SlowClassicTv;

    #[async_trait]
    impl Catalog for SlowClassicTv {
        async fn trending(
            &self,
            _scope: TrendingScope,
            _window: TimeWindow,
        ) -> Result<Vec<MediaSummary>, TmdbError> {
            Ok(items(25))
        }

        async fn popular(
            &self,
            _kind: MediaKind,
            _page: u32,
        ) -> Result<PagedResults<MediaSummary>, TmdbError> {
            Err(TmdbError::NotFound)
        }

        async fn top_rated(
            &self,
            _kind: MediaKind,
            _page: u32,
        ) -> Result<PagedResults<MediaSummary>, TmdbError> {
            Err(TmdbError::NotFound)
        }

        async fn new_releases(
            &self,
            _kind: MediaKind,
            _page: u32,
        ) -> Result<PagedResults<MediaSummary>, TmdbError> {
            Ok(PagedResults {
                results: items(4),
                total_pages: 1,
            })
        }

        async fn classic(&self, kind: MediaKind) -> Result<Vec<MediaSummary>, TmdbError> {
            if kind == MediaKind::Tv {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(items(3))
        }

        async fn discover_by_genre(
            &self,
            _kind: MediaKind,
            _genre: Option<u32>,
            _sort: CatalogSort,
            _page: u32,
        ) -> Result<PagedResults<MediaSummary>, TmdbError> {
            Err(TmdbError::NotFound)
        }

        async fn genres(&self, _kind: MediaKind) -> Result<Vec<Genre>, TmdbError> {
            Err(TmdbError::NotFound)
        }

        async fn search(
            &self,
            _query: &str,
            _page: u32,
        ) -> Result<PagedResults<MediaSummary>, TmdbError> {
            Err(TmdbError::NotFound)
        }

        async fn detail(&self, _kind: MediaKind, _id: u64) -> Result<MediaDetail, TmdbError> {
            Err(TmdbError::NotFound)
        }

        async fn credits(&self, _kind: MediaKind, _id: u64) -> Result<Vec<CastMember>, TmdbError> {
            Err(TmdbError::NotFound)
        }

        async fn seasons(&self, _id: u64) -> Result<Vec<Season>, TmdbError> {
            Err(TmdbError::NotFound)
        }

        async fn season_episodes(&self, _id: u64, _season: u32) -> Result<Vec<Episode>, TmdbError> {
            Err(TmdbError::NotFound)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hero_not_held_back_by_slow_shelf() {
        let scope = ViewScope::new();
        let (tx, mut rx) = watch::channel(HomeFeed::default());
        let start = Instant::now();

        let load = load_home_into(&SlowClassicTv, &scope, &tx);
        let first_hero = async {
            let feed = rx
                .wait_for(|feed| feed.hero.loaded().is_some())
                .await
                .unwrap();
            let classic_tv_pending = feed
                .shelf(ShelfId::ClassicTv)
                .map(|s| s.items.is_pending());
            (start.elapsed(), classic_tv_pending, feed.is_settled())
        };

        let (settled, (hero_at, classic_tv_pending, settled_then)) = tokio::join!(load, first_hero);

        assert!(settled);
        assert!(hero_at < Duration::from_secs(1));
        assert_eq!(classic_tv_pending, Some(true));
        assert!(!settled_then);

        let feed = tx.borrow();
        assert!(feed.is_settled());
        assert_eq!(feed.hero.loaded().map(Vec::len), Some(10));
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_left_view_keeps_settled_parts() {
        let scope = ViewScope::new();
        let (tx, mut rx) = watch::channel(HomeFeed::default());

        let load = load_home_into(&SlowClassicTv, &scope, &tx);
        let leave = async {
            rx.wait_for(|feed| feed.hero.loaded().is_some()).await.unwrap();
            scope.cancel();
        };

        let (settled, ()) = tokio::join!(load, leave);

        assert!(!settled);
        let feed = tx.borrow();
        assert!(feed.hero.loaded().is_some());
        assert!(feed.shelf(ShelfId::ClassicTv).unwrap().items.is_pending());
    }

    #[test]
    fn test_default_feed_is_pending() {
        let feed = HomeFeed::default();
        assert_eq!(feed.hero, ShelfResult::Pending);
        assert!(!feed.is_settled());
        assert_eq!(feed.shelves.len(), 5);
        assert_eq!(feed.shelves[0].title, "Trending Now");
        assert_eq!(feed.shelves[4].kind, Some(MediaKind::Tv));
    }
}
