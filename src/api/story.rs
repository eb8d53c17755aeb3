use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use super::{AppState, AuthedPlayer};
use crate::error::AppResult;
use crate::services::story as service;

#[derive(Deserialize)]
pub struct StartRequest {
    pub team_id: String,
}

pub async fn chapters(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
) -> AppResult<Json<Vec<service::ChapterSummary>>> {
    Ok(Json(service::chapters(&state.db, &authed.0).await?))
}

pub async fn chapter_detail(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<service::ChapterDetail>> {
    Ok(Json(service::chapter_detail(&state.db, &authed.0, &id).await?))
}

pub async fn stage(Path(id): Path<String>) -> AppResult<Json<service::StageView>> {
    Ok(Json(service::stage_view(&id)?))
}

pub async fn start_stage(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
    Json(body): Json<StartRequest>,
) -> AppResult<Json<service::StageStart>> {
    Ok(Json(service::start_stage(&state.db, &authed.0, &id, &body.team_id).await?))
}

pub async fn progress(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
) -> AppResult<Json<service::ProgressSummary>> {
    Ok(Json(service::progress(&state.db, &authed.0).await?))
}
