//! Application errors and the uniform HTTP error envelope.
//!
//! Services and the engine signal failures as structured values; the axum
//! layer converts them to `{ code, message, details }` exactly once, here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

use crate::game::engine::EngineError;
use crate::game::team::TeamError;

/// A resource kind for not-found errors; doubles as the error-code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Player,
    Hero,
    Equipment,
    Team,
    Battle,
    Stage,
    Chapter,
}

impl Resource {
    fn as_str(&self) -> &'static str {
        match self {
            Resource::Player => "player",
            Resource::Hero => "hero",
            Resource::Equipment => "equipment",
            Resource::Team => "team",
            Resource::Battle => "battle",
            Resource::Stage => "stage",
            Resource::Chapter => "chapter",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Resource::Player => "PLAYER_NOT_FOUND",
            Resource::Hero => "HERO_NOT_FOUND",
            Resource::Equipment => "EQUIPMENT_NOT_FOUND",
            Resource::Team => "TEAM_NOT_FOUND",
            Resource::Battle => "BATTLE_NOT_FOUND",
            Resource::Stage => "STAGE_NOT_FOUND",
            Resource::Chapter => "CHAPTER_NOT_FOUND",
        }
    }
}

/// The resource a debit would underflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Gold,
    Gems,
    Stamina,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Gold => "gold",
            ResourceKind::Gems => "gems",
            ResourceKind::Stamina => "stamina",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token has expired")]
    TokenExpired,
    #[error("invalid token")]
    InvalidToken,
    #[error("access denied")]
    AccessDenied,
    #[error("{resource} not found: {id}", resource = .0.as_str(), id = .1)]
    NotFound(Resource, String),
    #[error("duplicate {0}")]
    Duplicate(String),
    #[error("{0}")]
    Validation(String),
    #[error("insufficient {kind}: need {required}, have {available}", kind = .kind.as_str())]
    InsufficientResources { kind: ResourceKind, required: u64, available: u64 },
    #[error("it is not the player's turn")]
    NotPlayerTurn,
    #[error("invalid battle action: {0}")]
    InvalidAction(String),
    #[error("gacha error: {0}")]
    Gacha(String),
    #[error("hero is already at max level")]
    HeroMaxLevel,
    #[error("hero error: {0}")]
    Hero(String),
    #[error("equipment error: {0}")]
    Equipment(String),
    #[error("team is full")]
    TeamFull,
    #[error("team error: {0}")]
    Team(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::TokenExpired | AppError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Duplicate(_)
            | AppError::Validation(_)
            | AppError::InsufficientResources { .. }
            | AppError::NotPlayerTurn
            | AppError::InvalidAction(_)
            | AppError::Gacha(_)
            | AppError::HeroMaxLevel
            | AppError::Hero(_)
            | AppError::Equipment(_)
            | AppError::TeamFull
            | AppError::Team(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> String {
        match self {
            AppError::InvalidCredentials => "INVALID_CREDENTIALS".into(),
            AppError::TokenExpired => "TOKEN_EXPIRED".into(),
            AppError::InvalidToken => "INVALID_TOKEN".into(),
            AppError::AccessDenied => "ACCESS_DENIED".into(),
            AppError::NotFound(resource, _) => resource.code().into(),
            AppError::Duplicate(what) => format!("DUPLICATE_{}", what.to_uppercase()),
            AppError::Validation(_) => "VALIDATION_ERROR".into(),
            AppError::InsufficientResources { kind, .. } => {
                format!("INSUFFICIENT_{}", kind.as_str().to_uppercase())
            }
            AppError::NotPlayerTurn => "NOT_PLAYER_TURN".into(),
            AppError::InvalidAction(_) => "INVALID_ACTION".into(),
            AppError::Gacha(_) => "GACHA_ERROR".into(),
            AppError::HeroMaxLevel => "HERO_MAX_LEVEL".into(),
            AppError::Hero(_) => "HERO_ERROR".into(),
            AppError::Equipment(_) => "EQUIPMENT_ERROR".into(),
            AppError::TeamFull => "TEAM_FULL".into(),
            AppError::Team(_) => "TEAM_ERROR".into(),
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR".into(),
        }
    }

    fn details(&self) -> Value {
        match self {
            AppError::NotFound(resource, id) => {
                json!({ "resource": resource.as_str(), "id": id })
            }
            AppError::InsufficientResources { kind, required, available } => {
                json!({ "resource": kind.as_str(), "required": required, "available": available })
            }
            _ => json!({}),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Database details stay out of client responses
        let message = match &self {
            AppError::Database(_) | AppError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        let body = json!({
            "code": self.code(),
            "message": message,
            "details": self.details(),
        });
        (status, Json(body)).into_response()
    }
}

/// Battle engine failures surface as 400-level action errors.
impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::InvalidAction(err.to_string())
    }
}

impl From<TeamError> for AppError {
    fn from(err: TeamError) -> Self {
        match err {
            TeamError::Full => AppError::TeamFull,
            other => AppError::Team(other.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
