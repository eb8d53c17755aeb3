use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::error::AppResult;
use crate::services::auth as service;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let player_id = service::register(
        &state.db,
        service::RegisterInput {
            username: body.username,
            email: body.email,
            password: body.password,
            display_name: body.display_name,
        },
    )
    .await?;
    Ok(Json(json!({ "player_id": player_id })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<service::TokenPair>> {
    let pair =
        service::login(&state.db, &state.config.auth, &body.username, &body.password).await?;
    Ok(Json(pair))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<service::TokenPair>> {
    let pair = service::refresh(&state.db, &state.config.auth, &body.refresh_token).await?;
    Ok(Json(pair))
}
