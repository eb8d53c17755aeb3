use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use super::{AppState, AuthedPlayer};
use crate::error::AppResult;
use crate::game::team::Formation;
use crate::services::teams as service;

#[derive(Deserialize)]
pub struct CreateRequest {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Deserialize)]
pub struct MemberRequest {
    pub hero_id: String,
    pub x: u8,
    pub y: u8,
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub members: Option<Vec<MemberRequest>>,
}

#[derive(Deserialize)]
pub struct FormationRequest {
    pub formation_id: Option<String>,
}

fn member_inputs(members: Vec<MemberRequest>) -> Vec<service::MemberInput> {
    members
        .into_iter()
        .map(|m| service::MemberInput { hero_id: m.hero_id, x: m.x, y: m.y })
        .collect()
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
) -> AppResult<Json<Vec<service::TeamView>>> {
    Ok(Json(service::list(&state.db, &authed.0).await?))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<service::TeamView>> {
    Ok(Json(service::get(&state.db, &id, &authed.0).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Json(body): Json<CreateRequest>,
) -> AppResult<Json<service::TeamView>> {
    Ok(Json(service::create(&state.db, &authed.0, &body.name, body.is_default).await?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
    Json(body): Json<UpdateRequest>,
) -> AppResult<Json<service::TeamView>> {
    let members = body.members.map(member_inputs);
    Ok(Json(
        service::update(&state.db, &id, &authed.0, body.name.as_deref(), members.as_deref())
            .await?,
    ))
}

pub async fn delete_team(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    service::delete(&state.db, &id, &authed.0).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

pub async fn add_member(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
    Json(body): Json<MemberRequest>,
) -> AppResult<Json<service::TeamView>> {
    let member = service::MemberInput { hero_id: body.hero_id, x: body.x, y: body.y };
    Ok(Json(service::add_member(&state.db, &id, &authed.0, &member).await?))
}

pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path((id, hero_id)): Path<(String, String)>,
) -> AppResult<Json<service::TeamView>> {
    Ok(Json(service::remove_member(&state.db, &id, &authed.0, &hero_id).await?))
}

pub async fn update_formation(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
    Json(body): Json<FormationRequest>,
) -> AppResult<Json<service::TeamView>> {
    Ok(Json(
        service::update_formation(&state.db, &id, &authed.0, body.formation_id.as_deref()).await?,
    ))
}

pub async fn formations() -> Json<Vec<Formation>> {
    Json(service::formations())
}
