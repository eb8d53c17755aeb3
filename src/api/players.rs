use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use super::{AppState, AuthedPlayer};
use crate::error::{AppError, AppResult};
use crate::services::players as service;

/// Players may only read their own profile.
fn require_self(authed: &AuthedPlayer, id: &str) -> AppResult<()> {
    if authed.0 != id {
        return Err(AppError::AccessDenied);
    }
    Ok(())
}

pub async fn get_player(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<service::PlayerView>> {
    require_self(&authed, &id)?;
    Ok(Json(service::get_player(&state.db, &id).await?))
}

pub async fn get_resources(
    State(state): State<Arc<AppState>>,
    authed: AuthedPlayer,
    Path(id): Path<String>,
) -> AppResult<Json<service::Resources>> {
    require_self(&authed, &id)?;
    Ok(Json(service::get_resources(&state.db, &id).await?))
}
