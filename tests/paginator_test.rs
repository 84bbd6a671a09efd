//! Paginator tests against a mocked TMDB
//!
//! Search, TV catalog and genre lists all go through the same paginator.

use mockito::{Matcher, Server};
use cinedeck::api::TmdbClient;
use cinedeck::app::ViewScope;
use cinedeck::models::{CatalogSort, MediaKind};
use cinedeck::paginator::{
    GenreFilter, GenreListSource, PageStatus, Paginator, SearchSource, TvCatalogSource,
};

fn page_body(ids: &[u64], total_pages: u32) -> String {
    let items: Vec<String> = ids
        .iter()
        .map(|id| format!(r#"{{"id": {}, "media_type": "movie", "title": "Film {}"}}"#, id, id))
        .collect();
    format!(
        r#"{{"results": [{}], "total_pages": {}}}"#,
        items.join(","),
        total_pages
    )
}

#[tokio::test]
async fn test_search_pages_through_results() {
    let mut server = Server::new_async().await;

    let page1 = server
        .mock("GET", "/search/multi")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "dune".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(page_body(&[1, 2], 9000))
        .create_async()
        .await;
    let page2 = server
        .mock("GET", "/search/multi")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "dune".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(page_body(&[3, 4], 9000))
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("k", server.url());
    let source = SearchSource::new(&client);
    let scope = ViewScope::new();

    let mut paginator = Paginator::new();
    assert!(paginator.set_query("dune"));
    assert!(paginator.take_scroll_to_top());
    assert!(paginator.load(&source, &scope).await);

    page1.assert_async().await;
    assert_eq!(paginator.status(), &PageStatus::Loaded);
    // Upstream never serves past page 500
    assert_eq!(paginator.total_pages(), 500);
    assert!(!paginator.has_prev());
    assert!(paginator.has_next());

    assert!(paginator.next_page());
    assert!(paginator.take_scroll_to_top());
    assert!(paginator.load(&source, &scope).await);

    page2.assert_async().await;
    assert_eq!(paginator.current_page(), 2);
    let ids: Vec<u64> = paginator.results().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![3, 4]);

    // Out of range and wraparound are no-ops
    assert!(!paginator.go_to_page(501));
    assert!(!paginator.go_to_page(0));
    assert_eq!(paginator.current_page(), 2);
}

#[tokio::test]
async fn test_new_query_resets_to_first_page() {
    let mut server = Server::new_async().await;

    let _any = server
        .mock("GET", "/search/multi")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(page_body(&[1], 3))
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("k", server.url());
    let source = SearchSource::new(&client);
    let scope = ViewScope::new();

    let mut paginator = Paginator::new();
    paginator.set_query("alien");
    paginator.load(&source, &scope).await;
    paginator.go_to_page(3);
    paginator.load(&source, &scope).await;
    assert_eq!(paginator.current_page(), 3);

    assert!(paginator.set_query("aliens"));
    assert_eq!(paginator.current_page(), 1);
    assert_eq!(paginator.request().map(|r| r.page), Some(1));
    paginator.load(&source, &scope).await;
    assert_eq!(paginator.status(), &PageStatus::Loaded);
}

#[tokio::test]
async fn test_no_results_is_empty_not_error() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/search/multi")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": [], "total_pages": 0}"#)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("k", server.url());
    let mut paginator = Paginator::new();
    paginator.set_query("zzzzqqq");
    paginator
        .load(&SearchSource::new(&client), &ViewScope::new())
        .await;

    assert_eq!(paginator.status(), &PageStatus::Empty);
    assert_eq!(paginator.total_pages(), 1);
}

#[tokio::test]
async fn test_fetch_failure_is_error_state() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/tv/top_rated")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("k", server.url());
    let mut paginator = Paginator::with_mode(CatalogSort::TopRated);
    paginator
        .load(&TvCatalogSource::new(&client), &ViewScope::new())
        .await;

    assert_eq!(
        paginator.status(),
        &PageStatus::Error("TMDB API error: 503 Service Unavailable".into())
    );
    assert!(paginator.results().is_empty());
}

#[tokio::test]
async fn test_tv_sort_modes_hit_their_endpoints() {
    let mut server = Server::new_async().await;

    let popular = server
        .mock("GET", "/tv/popular")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(r#"{"results": [{"id": 1, "name": "P"}], "total_pages": 2}"#)
        .create_async()
        .await;
    let newest = server
        .mock("GET", "/tv/on_the_air")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(r#"{"results": [{"id": 2, "name": "N"}], "total_pages": 2}"#)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("k", server.url());
    let source = TvCatalogSource::new(&client);
    let scope = ViewScope::new();

    let mut paginator = Paginator::with_mode(CatalogSort::Popular);
    paginator.load(&source, &scope).await;
    assert_eq!(paginator.results()[0].kind, MediaKind::Tv);

    // Same mode again is a no-op
    assert!(!paginator.set_mode(CatalogSort::Popular));

    assert!(paginator.set_mode(CatalogSort::Newest));
    paginator.load(&source, &scope).await;

    popular.assert_async().await;
    newest.assert_async().await;
    assert_eq!(paginator.results()[0].id, 2);
}

#[tokio::test]
async fn test_genre_filter_change() {
    let mut server = Server::new_async().await;

    let action = server
        .mock("GET", "/discover/movie")
        .match_query(Matcher::UrlEncoded("with_genres".into(), "28".into()))
        .with_status(200)
        .with_body(page_body(&[10], 5))
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("k", server.url());
    let source = GenreListSource::new(&client, MediaKind::Movie);

    let mut paginator = Paginator::with_mode(GenreFilter {
        genre: Some(28),
        sort: CatalogSort::Popular,
    });
    paginator.load(&source, &ViewScope::new()).await;

    action.assert_async().await;
    assert_eq!(paginator.status(), &PageStatus::Loaded);
    assert_eq!(paginator.total_pages(), 5);
}

#[tokio::test]
async fn test_left_view_keeps_loading_state() {
    let server = Server::new_async().await;
    let client = TmdbClient::with_base_url("k", server.url());

    let scope = ViewScope::new();
    scope.cancel();

    let mut paginator = Paginator::new();
    paginator.set_query("dune");
    assert!(!paginator.load(&SearchSource::new(&client), &scope).await);
    assert_eq!(paginator.status(), &PageStatus::Loading);
}
