//! Catalogue endpoint handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Path, Query};
use crate::domain::{MangaDetail, MangaList};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_sort() -> String {
    "views".to_string()
}

fn default_page() -> u32 {
    1
}

/// GET /manga-list
pub async fn list_manga(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<MangaList>, ApiError> {
    debug!(sort = %params.sort, page = params.page, "Listing manga");

    let list = state.scraper.manga_list(&params.sort, params.page).await?;

    Ok(Json(list))
}

/// GET /manga/{slug}
pub async fn get_manga(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<MangaDetail>, ApiError> {
    debug!(slug = %slug, "Getting manga detail");

    let detail = state.scraper.manga_detail(&slug).await?;

    Ok(Json(detail))
}
