use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::{AppState, AuthedPlayer};
use crate::error::{AppError, AppResult};
use crate::game::element::Element;
use crate::game::hero::EquipSlot;
use crate::services::heroes as service;

#[derive(Deserialize)]
pub struct ListQuery {
    pub element: Option<String>,
    pub rarity: Option<u32>,
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
pub struct ExpItemRequest {
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct LevelUpRequest {
    #[serde(default)]
    pub exp_items: Vec<ExpItemRequest>,
}

#[derive(Deserialize)]
pub struct EquipRequest {
    pub equipment_id: String,
    pub slot: String,
}

#[derive(Deserialize)]
pub struct UnequipRequest {
    pub slot: String,
}

fn parse_slot(slot: &str) -> AppResult<EquipSlot> {
    EquipSlot::parse(slot).ok_or_else(|| AppError::Validation(format!("unknown slot: {slot}")))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<service::HeroPage>> {
    let element = match &query.element {
        Some(raw) => Some(
            Element::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown element: {raw}")))?,
        ),
        None => None,
    };
    let page = service::list(&state.db, &authed.0, element, query.rarity, query.page, query.per_page)
        .await?;
    Ok(Json(page))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<service::HeroView>> {
    Ok(Json(service::get(&state.db, &id, &authed.0).await?))
}

pub async fn level_up(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
    Json(body): Json<LevelUpRequest>,
) -> AppResult<Json<service::LevelUpOutcome>> {
    let items: Vec<service::ExpItem> = body
        .exp_items
        .into_iter()
        .map(|i| service::ExpItem { item_id: i.item_id, quantity: i.quantity })
        .collect();
    Ok(Json(service::level_up(&state.db, &id, &authed.0, &items).await?))
}

pub async fn ascend(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<service::AscendOutcome>> {
    Ok(Json(service::ascend(&state.db, &id, &authed.0).await?))
}

pub async fn awaken(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<service::AwakenOutcome>> {
    Ok(Json(service::awaken(&state.db, &id, &authed.0).await?))
}

pub async fn equip(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
    Json(body): Json<EquipRequest>,
) -> AppResult<Json<service::EquipOutcome>> {
    let slot = parse_slot(&body.slot)?;
    Ok(Json(service::equip(&state.db, &id, &authed.0, &body.equipment_id, slot).await?))
}

pub async fn unequip(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
    Json(body): Json<UnequipRequest>,
) -> AppResult<Json<service::EquipOutcome>> {
    let slot = parse_slot(&body.slot)?;
    Ok(Json(service::unequip(&state.db, &id, &authed.0, slot).await?))
}
