use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use super::{AppState, AuthedPlayer};
use crate::error::{AppError, AppResult};
use crate::services::battles as service;
use crate::session::BattleRecord;

#[derive(Deserialize)]
pub struct StartRequest {
    pub stage_id: String,
    pub team_id: String,
}

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    Attack { attacker_id: String, target_id: String },
    Skill { caster_id: String, skill_id: String, target_ids: Vec<String> },
    Heal { caster_id: String, target_ids: Vec<String> },
}

pub async fn start(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Json(body): Json<StartRequest>,
) -> AppResult<Json<service::BattleSnapshot>> {
    Ok(Json(
        service::start_battle(
            &state.db,
            &state.sessions,
            &authed.0,
            &body.stage_id,
            &body.team_id,
            None,
        )
        .await?,
    ))
}

pub async fn state(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<service::BattleSnapshot>> {
    Ok(Json(service::get_state(&state.sessions, &authed.0, &id).await?))
}

pub async fn action(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
    Json(body): Json<ActionRequest>,
) -> AppResult<Json<service::ActionResponse>> {
    let action = match body {
        ActionRequest::Attack { attacker_id, target_id } => {
            service::PlayerAction::Attack { attacker_id, target_id }
        }
        ActionRequest::Skill { caster_id, skill_id, target_ids } => {
            if target_ids.is_empty() {
                return Err(AppError::Validation("target_ids cannot be empty".into()));
            }
            service::PlayerAction::Skill { caster_id, skill_id, target_ids }
        }
        ActionRequest::Heal { caster_id, target_ids } => {
            if target_ids.is_empty() {
                return Err(AppError::Validation("target_ids cannot be empty".into()));
            }
            service::PlayerAction::Heal { caster_id, target_ids }
        }
    };
    Ok(Json(service::execute_action(&state.sessions, &authed.0, &id, action).await?))
}

pub async fn end(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<service::FinalizeResponse>> {
    Ok(Json(service::finalize(&state.db, &state.sessions, &authed.0, &id).await?))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
) -> AppResult<Json<Vec<BattleRecord>>> {
    Ok(Json(service::history(&state.sessions, &authed.0).await))
}
