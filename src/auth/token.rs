//! Opaque bearer tokens stored server-side: short-lived access tokens plus
//! longer-lived refresh tokens, both UUID v4.

use sqlx::sqlite::SqlitePool;

pub const ACCESS: &str = "access";
pub const REFRESH: &str = "refresh";

/// Generate a cryptographically secure token (UUID v4).
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Issue a token of the given kind, valid for `duration_minutes`.
pub async fn create_token(
    pool: &SqlitePool,
    player_id: &str,
    kind: &str,
    duration_minutes: u32,
) -> Result<String, sqlx::Error> {
    let token = generate_token();
    let expires = format!("+{} minutes", duration_minutes);
    sqlx::query(
        "INSERT INTO sessions (token, player_id, kind, expires_at) \
         VALUES (?, ?, ?, datetime('now', ?))",
    )
    .bind(&token)
    .bind(player_id)
    .bind(kind)
    .bind(&expires)
    .execute(pool)
    .await?;
    Ok(token)
}

/// Resolve a live token of the given kind to its player id. Returns `None`
/// for unknown, expired, or wrong-kind tokens.
pub async fn validate_token(
    pool: &SqlitePool,
    token: &str,
    kind: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT player_id FROM sessions \
         WHERE token = ? AND kind = ? AND datetime(expires_at) > datetime('now')",
    )
    .bind(token)
    .bind(kind)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id,)| id))
}

/// Delete a specific token (logout / refresh rotation).
pub async fn delete_token(pool: &SqlitePool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Remove all expired tokens. Returns the number of rows deleted.
pub async fn cleanup_expired(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE datetime(expires_at) <= datetime('now')")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
