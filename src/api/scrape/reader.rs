//! Reader endpoint handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{deserialize_flag, ApiError, Path, Query};
use crate::domain::ChapterImages;

#[derive(Debug, Deserialize)]
pub struct ChapterParams {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub debug: bool,
}

#[derive(Debug, Deserialize)]
pub struct FromUrlParams {
    pub url: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub debug: bool,
}

/// GET /reader/{slug}/{chapter}
pub async fn get_chapter(
    State(state): State<AppState>,
    Path((slug, chapter)): Path<(String, u32)>,
    Query(params): Query<ChapterParams>,
) -> Result<Json<ChapterImages>, ApiError> {
    debug!(slug = %slug, chapter, debug = params.debug, "Getting chapter images");

    let images = state
        .scraper
        .chapter_images(&slug, chapter, params.debug)
        .await?;

    Ok(Json(images))
}

/// GET /reader/from-url
pub async fn chapter_from_url(
    State(state): State<AppState>,
    Query(params): Query<FromUrlParams>,
) -> Result<Json<ChapterImages>, ApiError> {
    debug!(url = %params.url, "Resolving chapter from URL");

    let images = state
        .scraper
        .chapter_images_from_url(&params.url, params.debug)
        .await?;

    Ok(Json(images))
}
