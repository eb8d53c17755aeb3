//! HTTP surface: route table, shared state, and the bearer-token extractor.
//! Handlers only translate between JSON and service calls; every rule lives
//! in [`crate::services`].

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::{delete, get, post, put};
use axum::Router;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::AppError;
use crate::session::SessionStore;

pub mod auth;
pub mod battles;
pub mod equipment;
pub mod gacha;
pub mod heroes;
pub mod players;
pub mod story;
pub mod teams;

pub struct AppState {
    pub config: Config,
    pub db: SqlitePool,
    pub sessions: SessionStore,
}

/// The authenticated player, resolved from the `Authorization: Bearer`
/// access token.
pub struct AuthedPlayer(pub String);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthedPlayer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::InvalidToken)?;
        let token = header.strip_prefix("Bearer ").ok_or(AppError::InvalidToken)?;
        let player_id = crate::services::auth::authenticate(&state.db, token).await?;
        Ok(AuthedPlayer(player_id))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/players/:id", get(players::get_player))
        .route("/players/:id/resources", get(players::get_resources))
        .route("/heroes", get(heroes::list))
        .route("/heroes/:id", get(heroes::get))
        .route("/heroes/:id/level-up", post(heroes::level_up))
        .route("/heroes/:id/ascend", post(heroes::ascend))
        .route("/heroes/:id/awaken", post(heroes::awaken))
        .route("/heroes/:id/equip", post(heroes::equip))
        .route("/heroes/:id/unequip", post(heroes::unequip))
        .route("/teams", get(teams::list).post(teams::create))
        .route("/teams/formations", get(teams::formations))
        .route(
            "/teams/:id",
            get(teams::get).put(teams::update).delete(teams::delete_team),
        )
        .route("/teams/:id/members", post(teams::add_member))
        .route("/teams/:id/members/:hero_id", delete(teams::remove_member))
        .route("/teams/:id/formation", put(teams::update_formation))
        .route("/equipment", get(equipment::list))
        .route("/equipment/:id", get(equipment::get))
        .route("/equipment/:id/enhance", post(equipment::enhance))
        .route("/equipment/fuse", post(equipment::fuse))
        .route("/gacha/banners", get(gacha::banners))
        .route("/gacha/pity", get(gacha::pity))
        .route("/gacha/pull", post(gacha::pull))
        .route("/gacha/history", get(gacha::history))
        .route("/story/chapters", get(story::chapters))
        .route("/story/chapters/:id", get(story::chapter_detail))
        .route("/story/stages/:id", get(story::stage))
        .route("/story/stages/:id/start", post(story::start_stage))
        .route("/story/progress", get(story::progress))
        .route("/battles/start", post(battles::start))
        .route("/battles/history", get(battles::history))
        .route("/battles/:id/state", get(battles::state))
        .route("/battles/:id/action", post(battles::action))
        .route("/battles/:id/end", post(battles::end))
        .with_state(state)
}
