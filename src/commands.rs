//! CLI Command Handlers
//!
//! Implements all CLI commands on top of the page controllers.
//! Each handler takes CLI args, the resolved config and Output, returns ExitCode.

use std::fmt;

use serde::Serialize;

use crate::api::tmdb::{Catalog, TmdbClient, TmdbError};
use crate::api::SubtitleServiceClient;
use crate::app::{App, ViewScope};
use crate::cli::{
    EpisodesCmd, ExitCode, GenresCmd, HeroCmd, HeroFrame, HomeCmd, InfoCmd, MoviesCmd, Output,
    PageOutput, SearchCmd, SeasonsCmd, TvCmd, WatchCmd, WatchResponse,
};
use crate::config::Config;
use crate::detail::load_detail;
use crate::hero::{HeroRotator, HeroSelection};
use crate::home::{load_home, ShelfResult};
use crate::models::{CatalogSort, MediaKind, TimeWindow, TrendingScope};
use crate::paginator::{
    GenreFilter, GenreListSource, PageSource, PageStatus, Paginator, SearchSource, TvCatalogSource,
};
use crate::stream::player::PlayerUrlBuilder;
use crate::stream::subtitles::SubtitleState;
use crate::watch::WatchSession;

/// Print `data` as JSON, mapping serialization failures to an error exit
fn emit<T: Serialize>(output: &Output, data: T) -> ExitCode {
    match output.print(data) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

fn catalog_error(output: &Output, context: &str, err: &TmdbError) -> ExitCode {
    output.error(format!("{}: {}", context, err), ExitCode::from(err))
}

// =============================================================================
// Home Command
// =============================================================================

pub async fn home_cmd(cmd: HomeCmd, config: &Config, output: &Output) -> ExitCode {
    let client = TmdbClient::from_config(config);
    let scope = ViewScope::new();

    output.info(format!("Loading {}...", config.display_name));

    let Some(feed) = load_home(&client, &scope).await else {
        return output.error("Home page load was cancelled", ExitCode::Error);
    };

    if feed.all_failed() {
        let reason = feed
            .failures()
            .first()
            .map(|(_, msg)| msg.to_string())
            .unwrap_or_default();
        return output.error(
            format!("Failed to load home page: {}", reason),
            ExitCode::NetworkError,
        );
    }

    if output.json {
        return emit(output, &feed);
    }

    output.line(format!("== {} ==", config.display_name));
    if let Some(hero) = feed.hero_selection().current() {
        output.line(format!("\n★ {}", hero));
        if !hero.overview.is_empty() {
            output.line(format!("  {}", hero.overview));
        }
    }

    for shelf in &feed.shelves {
        output.line(format!("\n{}", shelf.title));
        match &shelf.items {
            ShelfResult::Loaded(items) if items.is_empty() => output.line("  (nothing here)"),
            ShelfResult::Loaded(items) => {
                for item in items.iter().take(cmd.limit) {
                    output.line(format!("  {:>8}  {}", item.id, item));
                }
            }
            ShelfResult::Failed(msg) => output.line(format!("  (unavailable: {})", msg)),
            ShelfResult::Pending => output.line("  ..."),
        }
    }
    ExitCode::Success
}

// =============================================================================
// Hero Command
// =============================================================================

pub async fn hero_cmd(cmd: HeroCmd, config: &Config, output: &Output) -> ExitCode {
    let client = TmdbClient::from_config(config);
    let mut app = App::new(config.display_name.clone());
    let scope = app.scope().clone();

    let trending = match client.trending(TrendingScope::All, TimeWindow::Week).await {
        Ok(items) => items,
        Err(e) => return catalog_error(output, "Trending fetch failed", &e),
    };

    let selection = HeroSelection::new(trending);
    if selection.is_empty() {
        return output.error("Nothing is trending", ExitCode::NoResults);
    }

    let mut rotator = HeroRotator::new(selection, &scope);
    if let Some(index) = cmd.select {
        if index >= rotator.selection().len() {
            return output.error(
                format!(
                    "Hero index {} out of range (0-{})",
                    index,
                    rotator.selection().len() - 1
                ),
                ExitCode::InvalidArgs,
            );
        }
        rotator.select(index);
    }

    let mut frames = vec![frame(0, &rotator.selection())];
    if !output.json {
        print_frame(output, &frames[0]);
    }

    let mut updates = rotator.subscribe();
    rotator.start();

    for tick in 1..=cmd.ticks {
        if updates.changed().await.is_err() {
            break;
        }
        let current = frame(tick, &updates.borrow_and_update());
        if !output.json {
            print_frame(output, &current);
        }
        frames.push(current);
    }

    rotator.stop();
    app.close();

    if output.json {
        return emit(output, &frames);
    }
    ExitCode::Success
}

fn frame(tick: u32, selection: &HeroSelection) -> HeroFrame {
    HeroFrame {
        tick,
        cursor: selection.cursor(),
        item: selection.current().cloned(),
    }
}

fn print_frame(output: &Output, frame: &HeroFrame) {
    if let Some(item) = &frame.item {
        output.line(format!("[{}] {}", frame.cursor, item));
    }
}

// =============================================================================
// Paged Lists
// =============================================================================

/// Load page 1 of the paginator's mode, then move to `page` if asked
async fn run_paged<M, S>(
    mut paginator: Paginator<M>,
    source: &S,
    page: u32,
    label: String,
    output: &Output,
) -> ExitCode
where
    M: Clone + PartialEq + fmt::Debug + Send + Sync,
    S: PageSource<M> + ?Sized,
{
    let scope = ViewScope::new();

    paginator.load(source, &scope).await;

    // Page count is only known once page 1 is in
    if page > 1 && matches!(paginator.status(), PageStatus::Loaded | PageStatus::Empty) {
        if !paginator.go_to_page(page) {
            return output.error(
                format!(
                    "Page {} out of range (1-{})",
                    page,
                    paginator.total_pages()
                ),
                ExitCode::InvalidArgs,
            );
        }
        paginator.load(source, &scope).await;
    }

    match paginator.status() {
        PageStatus::Error(msg) => output.error(msg.clone(), ExitCode::NetworkError),
        PageStatus::Empty => output.error(format!("No results for {}", label), ExitCode::NoResults),
        PageStatus::Idle | PageStatus::Loading => {
            output.error("Nothing to load", ExitCode::InvalidArgs)
        }
        PageStatus::Loaded => {
            if output.json {
                return emit(
                    output,
                    PageOutput {
                        mode: label,
                        page: paginator.current_page(),
                        total_pages: paginator.total_pages(),
                        results: paginator.results().to_vec(),
                    },
                );
            }
            for item in paginator.results() {
                output.line(format!("{:>8}  {}", item.id, item));
            }
            output.info(format!(
                "\nPage {} of {}",
                paginator.current_page(),
                paginator.total_pages()
            ));
            ExitCode::Success
        }
    }
}

pub async fn search_cmd(cmd: SearchCmd, config: &Config, output: &Output) -> ExitCode {
    let client = TmdbClient::from_config(config);
    let mut paginator = Paginator::new();
    if !paginator.set_query(&cmd.query) {
        return output.error("Search query is empty", ExitCode::InvalidArgs);
    }

    output.info(format!("Searching for: {}", cmd.query.trim()));
    let label = format!("\"{}\"", cmd.query.trim());
    run_paged(paginator, &SearchSource::new(&client), cmd.page, label, output).await
}

pub async fn tv_cmd(cmd: TvCmd, config: &Config, output: &Output) -> ExitCode {
    let client = TmdbClient::from_config(config);
    let sort: CatalogSort = cmd.sort.into();
    let paginator = Paginator::with_mode(sort);

    output.info(format!("TV Shows ({})", sort));
    let label = format!("TV Shows ({})", sort);
    run_paged(paginator, &TvCatalogSource::new(&client), cmd.page, label, output).await
}

pub async fn movies_cmd(cmd: MoviesCmd, config: &Config, output: &Output) -> ExitCode {
    let client = TmdbClient::from_config(config);
    let filter = GenreFilter {
        genre: cmd.genre,
        sort: cmd.sort.into(),
    };
    let paginator = Paginator::with_mode(filter);
    let label = match filter.genre {
        Some(genre) => format!("Movies (genre {}, {})", genre, filter.sort),
        None => format!("Movies ({})", filter.sort),
    };

    output.info(&label);
    let source = GenreListSource::new(&client, MediaKind::Movie);
    run_paged(paginator, &source, cmd.page, label, output).await
}

// =============================================================================
// Genres Command
// =============================================================================

pub async fn genres_cmd(cmd: GenresCmd, config: &Config, output: &Output) -> ExitCode {
    let client = TmdbClient::from_config(config);
    let kind: MediaKind = cmd.kind.into();

    match client.genres(kind).await {
        Ok(genres) if genres.is_empty() => {
            output.error(format!("No genres for {}", kind), ExitCode::NoResults)
        }
        Ok(genres) => {
            if output.json {
                return emit(output, &genres);
            }
            for genre in &genres {
                output.line(genre);
            }
            ExitCode::Success
        }
        Err(e) => catalog_error(output, "Genre fetch failed", &e),
    }
}

// =============================================================================
// Info Command
// =============================================================================

pub async fn info_cmd(cmd: InfoCmd, config: &Config, output: &Output) -> ExitCode {
    let client = TmdbClient::from_config(config);
    let kind: MediaKind = cmd.kind.into();

    output.info(format!("Getting info for {} {}", kind, cmd.id));

    match load_detail(&client, kind, cmd.id).await {
        Ok(page) => {
            if output.json {
                return emit(output, &page);
            }
            let detail = &page.detail;
            output.line(&detail.summary.title);
            output.line(page.facts().join("  •  "));
            if !detail.genres.is_empty() {
                output.line(detail.genres_str());
            }
            if let Some(tagline) = &detail.tagline {
                output.line(format!("\"{}\"", tagline));
            }
            output.line(format!("\n{}", detail.summary.overview));
            if !page.cast.is_empty() {
                output.line("\nCast:");
                for member in &page.cast {
                    match &member.character {
                        Some(character) => output.line(format!("  {} as {}", member.name, character)),
                        None => output.line(format!("  {}", member.name)),
                    }
                }
            }
            ExitCode::Success
        }
        Err(e) => catalog_error(output, "Info failed", &e),
    }
}

// =============================================================================
// Seasons / Episodes Commands
// =============================================================================

pub async fn seasons_cmd(cmd: SeasonsCmd, config: &Config, output: &Output) -> ExitCode {
    let client = TmdbClient::from_config(config);

    match client.seasons(cmd.id).await {
        Ok(seasons) if seasons.is_empty() => {
            output.error(format!("Show {} has no seasons", cmd.id), ExitCode::NoResults)
        }
        Ok(seasons) => {
            if output.json {
                return emit(output, &seasons);
            }
            for season in &seasons {
                output.line(format!("{:>3}  {}", season.season_number, season));
            }
            ExitCode::Success
        }
        Err(e) => catalog_error(output, "Season fetch failed", &e),
    }
}

pub async fn episodes_cmd(cmd: EpisodesCmd, config: &Config, output: &Output) -> ExitCode {
    let client = TmdbClient::from_config(config);

    match client.season_episodes(cmd.id, cmd.season).await {
        Ok(episodes) if episodes.is_empty() => output.error(
            format!("Season {} has no episodes", cmd.season),
            ExitCode::NoResults,
        ),
        Ok(episodes) => {
            if output.json {
                return emit(output, &episodes);
            }
            for episode in &episodes {
                output.line(format!("{}  ⭐ {}", episode, episode.rating_label()));
            }
            ExitCode::Success
        }
        Err(e) => catalog_error(output, "Episode fetch failed", &e),
    }
}

// =============================================================================
// Watch Command
// =============================================================================

pub async fn watch_cmd(cmd: WatchCmd, config: &Config, output: &Output) -> ExitCode {
    if let Err(e) = cmd.validate() {
        return output.error(e, ExitCode::InvalidArgs);
    }

    let client = TmdbClient::from_config(config);
    let subtitles = SubtitleServiceClient::from_config(config);
    let player = PlayerUrlBuilder::from_config(config);
    let scope = ViewScope::new();
    let kind: MediaKind = cmd.kind.into();

    let mut session = WatchSession::new(&client, &subtitles, player, kind, cmd.id);
    if let Err(e) = session.load().await {
        return catalog_error(output, "Failed to load show", &e);
    }

    if let Some(season) = cmd.season {
        match session.select_season(season).await {
            Ok(true) => {}
            Ok(false) => {
                return output.error(format!("Season {} not found", season), ExitCode::NotFound)
            }
            Err(e) => return catalog_error(output, "Episode fetch failed", &e),
        }
    }
    if let Some(episode) = cmd.episode {
        if !session.select_episode(episode) {
            return output.error(format!("Episode {} not found", episode), ExitCode::NotFound);
        }
    }

    if session.target().is_none() {
        return output.error(
            format!("Nothing playable for show {}", cmd.id),
            ExitCode::NoResults,
        );
    }

    if !cmd.no_subtitle {
        output.info("Fetching Kurdish subtitle...");
        if let Some(state) = session.fetch_subtitle(&scope).await {
            if let Some(message) = state.message() {
                output.info(message);
            }
        }
    }

    let Some(url) = session.player_url(!cmd.no_subtitle) else {
        return output.error("Nothing to play", ExitCode::NoResults);
    };

    if output.json {
        return emit(
            output,
            WatchResponse {
                url: url.url.clone(),
                kind,
                id: cmd.id,
                season: session.selected_season(),
                episode: session.selected_episode(),
                subtitle: session.subtitle_state().clone(),
            },
        );
    }

    if let Some(episode) = session
        .episodes()
        .iter()
        .find(|e| Some(e.episode_number) == session.selected_episode())
    {
        output.info(format!("Now playing: {}", episode));
    }
    if let SubtitleState::Error { .. } = session.subtitle_state() {
        output.info("Playing without subtitle");
    }
    output.line(url);
    ExitCode::Success
}
