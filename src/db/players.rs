//! Player rows: accounts, levels, and the resource wallet.
//!
//! Debits are guarded single statements: the WHERE clause re-checks every
//! balance, so a failed precondition touches nothing and concurrent spends
//! cannot interleave into a negative balance.

use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub level: i64,
    pub exp: i64,
    pub gold: i64,
    pub gems: i64,
    pub stamina: i64,
    pub max_stamina: i64,
    pub vip_level: i64,
    pub created_at: String,
    pub last_login: Option<String>,
}

pub async fn create_player(
    pool: &SqlitePool,
    id: &str,
    username: &str,
    email: &str,
    password_hash: &str,
    display_name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO players (id, username, email, password_hash, display_name) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_player(pool: &SqlitePool, id: &str) -> Result<Option<PlayerRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM players WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<PlayerRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM players WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn username_or_email_taken(
    pool: &SqlitePool,
    username: &str,
    email: &str,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM players WHERE username = ? OR email = ? LIMIT 1")
            .bind(username)
            .bind(email)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

/// Atomically debit gold/gems/stamina. Returns false (and changes nothing)
/// when any balance is short. Takes any executor so it can join a larger
/// transaction.
pub async fn spend_resources<'e, E>(
    executor: E,
    player_id: &str,
    gold: i64,
    gems: i64,
    stamina: i64,
) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE players SET gold = gold - ?, gems = gems - ?, stamina = stamina - ? \
         WHERE id = ? AND gold >= ? AND gems >= ? AND stamina >= ?",
    )
    .bind(gold)
    .bind(gems)
    .bind(stamina)
    .bind(player_id)
    .bind(gold)
    .bind(gems)
    .bind(stamina)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Credit resources. Gold and gems accumulate freely; stamina saturates at
/// the player's max.
pub async fn add_resources(
    pool: &SqlitePool,
    player_id: &str,
    gold: i64,
    gems: i64,
    stamina: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE players SET \
         gold = gold + ?, \
         gems = gems + ?, \
         stamina = MIN(stamina + ?, max_stamina) \
         WHERE id = ?",
    )
    .bind(gold)
    .bind(gems)
    .bind(stamina)
    .bind(player_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_level_exp(
    pool: &SqlitePool,
    player_id: &str,
    level: i64,
    exp: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE players SET level = ?, exp = ? WHERE id = ?")
        .bind(level)
        .bind(exp)
        .bind(player_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn touch_last_login(pool: &SqlitePool, player_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE players SET last_login = datetime('now') WHERE id = ?")
        .bind(player_id)
        .execute(pool)
        .await?;
    Ok(())
}
