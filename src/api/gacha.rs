use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::{AppState, AuthedPlayer};
use crate::error::AppResult;
use crate::services::gacha as service;

#[derive(Deserialize)]
pub struct PityQuery {
    pub banner_id: String,
}

#[derive(Deserialize)]
pub struct PullRequest {
    pub banner_id: String,
    #[serde(default = "default_pull_count")]
    pub pull_count: u32,
}

fn default_pull_count() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

pub async fn banners() -> Json<Vec<service::BannerView>> {
    Json(service::banners())
}

pub async fn pity(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Query(query): Query<PityQuery>,
) -> AppResult<Json<service::PityView>> {
    Ok(Json(service::pity(&state.db, &authed.0, &query.banner_id).await?))
}

pub async fn pull(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Json(body): Json<PullRequest>,
) -> AppResult<Json<service::PullOutcome>> {
    Ok(Json(
        service::pull(&state.db, &authed.0, &body.banner_id, body.pull_count, None).await?,
    ))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<service::HistoryPage>> {
    Ok(Json(service::history(&state.db, &authed.0, query.page, query.per_page).await?))
}
