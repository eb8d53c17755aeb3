use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::{AppState, AuthedPlayer};
use crate::error::{AppError, AppResult};
use crate::game::equipment::{EquipmentType, Rarity};
use crate::services::equipment as service;

#[derive(Deserialize)]
pub struct ListQuery {
    pub equipment_type: Option<String>,
    pub rarity: Option<String>,
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

#[derive(Deserialize)]
pub struct FuseRequest {
    pub equipment_ids: Vec<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<service::EquipmentPage>> {
    let equipment_type = match &query.equipment_type {
        Some(raw) => Some(
            EquipmentType::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown equipment type: {raw}")))?,
        ),
        None => None,
    };
    let rarity = match &query.rarity {
        Some(raw) => Some(
            Rarity::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown rarity: {raw}")))?,
        ),
        None => None,
    };
    Ok(Json(
        service::list(&state.db, &authed.0, equipment_type, rarity, query.page, query.per_page)
            .await?,
    ))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<service::EquipmentView>> {
    Ok(Json(service::get(&state.db, &id, &authed.0).await?))
}

pub async fn enhance(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<service::EnhanceOutcome>> {
    Ok(Json(service::enhance(&state.db, &id, &authed.0).await?))
}

pub async fn fuse(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Json(body): Json<FuseRequest>,
) -> AppResult<Json<service::FuseOutcome>> {
    Ok(Json(service::fuse(&state.db, &authed.0, &body.equipment_ids).await?))
}
