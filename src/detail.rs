//! Detail page controller

use serde::Serialize;

use crate::api::tmdb::{Catalog, TmdbError};
use crate::app::ViewScope;
use crate::models::{CastMember, MediaDetail, MediaKind, MAX_CAST_MEMBERS};

/// Everything the detail page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailPage {
    pub detail: MediaDetail,
    pub cast: Vec<CastMember>,
}

impl DetailPage {
    pub fn kind(&self) -> MediaKind {
        self.detail.summary.kind
    }

    /// Year, rating and runtime or season count, in display order
    pub fn facts(&self) -> Vec<String> {
        let summary = &self.detail.summary;
        let mut facts = Vec::new();
        if let Some(year) = summary.year() {
            facts.push(year.to_string());
        }
        facts.push(format!("⭐ {}", summary.rating_label()));
        if let Some(runtime) = self.detail.runtime_label() {
            facts.push(runtime);
        }
        if let Some(seasons) = self.detail.seasons_label() {
            facts.push(seasons);
        }
        facts
    }
}

/// Fetch detail and credits together; either failing fails the page.
pub async fn load_detail(
    catalog: &dyn Catalog,
    kind: MediaKind,
    id: u64,
) -> Result<DetailPage, TmdbError> {
    let (detail, mut cast) = tokio::try_join!(catalog.detail(kind, id), catalog.credits(kind, id))?;
    cast.truncate(MAX_CAST_MEMBERS);

    tracing::debug!(%kind, id, cast = cast.len(), "Detail loaded");
    Ok(DetailPage { detail, cast })
}

/// [`load_detail`] bound to a view; `None` once the view is gone
pub async fn load_detail_scoped(
    catalog: &dyn Catalog,
    kind: MediaKind,
    id: u64,
    scope: &ViewScope,
) -> Option<Result<DetailPage, TmdbError>> {
    scope.run(load_detail(catalog, kind, id)).await
}
