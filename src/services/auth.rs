//! Registration, login, and token refresh.

use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::{password, token, validation};
use crate::config::AuthConfig;
use crate::db::players as db;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub player_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in_minutes: u32,
}

/// Create an account with starting resources. Validation failures are 400s;
/// a username or email collision is a duplicate-resource error.
pub async fn register(pool: &SqlitePool, input: RegisterInput) -> AppResult<String> {
    validation::validate_username(&input.username).map_err(AppError::Validation)?;
    validation::validate_email(&input.email).map_err(AppError::Validation)?;
    validation::validate_password(&input.password).map_err(AppError::Validation)?;
    validation::validate_display_name(&input.display_name).map_err(AppError::Validation)?;

    if db::username_or_email_taken(pool, &input.username, &input.email).await? {
        return Err(AppError::Duplicate("player".into()));
    }

    let password = input.password.clone();
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let player_id = Uuid::new_v4().to_string();
    db::create_player(
        pool,
        &player_id,
        &input.username,
        &input.email,
        &hash,
        input.display_name.trim(),
    )
    .await?;
    Ok(player_id)
}

/// Verify credentials and issue an access + refresh token pair.
pub async fn login(
    pool: &SqlitePool,
    auth: &AuthConfig,
    username: &str,
    password_input: &str,
) -> AppResult<TokenPair> {
    let player = db::get_by_username(pool, username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let hash = player.password_hash.clone();
    let password_input = password_input.to_string();
    let ok = tokio::task::spawn_blocking(move || password::verify_password(&password_input, &hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !ok {
        return Err(AppError::InvalidCredentials);
    }

    let access =
        token::create_token(pool, &player.id, token::ACCESS, auth.access_token_minutes).await?;
    let refresh =
        token::create_token(pool, &player.id, token::REFRESH, auth.refresh_token_days * 24 * 60)
            .await?;
    db::touch_last_login(pool, &player.id).await?;

    Ok(TokenPair {
        player_id: player.id,
        access_token: access,
        refresh_token: refresh,
        expires_in_minutes: auth.access_token_minutes,
    })
}

/// Rotate a fresh access token off a live refresh token.
pub async fn refresh(
    pool: &SqlitePool,
    auth: &AuthConfig,
    refresh_token: &str,
) -> AppResult<TokenPair> {
    let player_id = token::validate_token(pool, refresh_token, token::REFRESH)
        .await?
        .ok_or(AppError::InvalidToken)?;
    let access =
        token::create_token(pool, &player_id, token::ACCESS, auth.access_token_minutes).await?;
    Ok(TokenPair {
        player_id,
        access_token: access,
        refresh_token: refresh_token.to_string(),
        expires_in_minutes: auth.access_token_minutes,
    })
}

/// Resolve a bearer access token to a player id.
pub async fn authenticate(pool: &SqlitePool, bearer: &str) -> AppResult<String> {
    token::validate_token(pool, bearer, token::ACCESS)
        .await?
        .ok_or(AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_pool;

    fn auth_config() -> AuthConfig {
        AuthConfig { access_token_minutes: 30, refresh_token_days: 7 }
    }

    fn input() -> RegisterInput {
        RegisterInput {
            username: "tranquocbao".into(),
            email: "bao@example.com".into(),
            password: "mat-khau-184".into(),
            display_name: "Quốc Bảo".into(),
        }
    }

    #[tokio::test]
    async fn register_login_refresh_round_trip() {
        let (pool, _dir) = test_pool().await;
        let player_id = register(&pool, input()).await.unwrap();

        let pair = login(&pool, &auth_config(), "tranquocbao", "mat-khau-184").await.unwrap();
        assert_eq!(pair.player_id, player_id);
        assert_eq!(authenticate(&pool, &pair.access_token).await.unwrap(), player_id);

        let rotated = refresh(&pool, &auth_config(), &pair.refresh_token).await.unwrap();
        assert_ne!(rotated.access_token, pair.access_token);
        assert_eq!(authenticate(&pool, &rotated.access_token).await.unwrap(), player_id);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let (pool, _dir) = test_pool().await;
        register(&pool, input()).await.unwrap();

        let mut second = input();
        second.email = "other@example.com".into();
        let err = register(&pool, second).await.unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_PLAYER");
    }

    #[tokio::test]
    async fn wrong_password_and_bad_tokens() {
        let (pool, _dir) = test_pool().await;
        register(&pool, input()).await.unwrap();

        let err = login(&pool, &auth_config(), "tranquocbao", "wrong-pass-1").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_CREDENTIALS");
        let err = login(&pool, &auth_config(), "nobody", "mat-khau-184").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_CREDENTIALS");
        let err = authenticate(&pool, "not-a-token").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn refresh_rejects_access_tokens() {
        let (pool, _dir) = test_pool().await;
        register(&pool, input()).await.unwrap();
        let pair = login(&pool, &auth_config(), "tranquocbao", "mat-khau-184").await.unwrap();

        // Access tokens are not refresh tokens
        let err = refresh(&pool, &auth_config(), &pair.access_token).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn validation_failures_are_400s() {
        let (pool, _dir) = test_pool().await;
        let mut bad = input();
        bad.password = "short".into();
        let err = register(&pool, bad).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
