//! Gacha pity counters and pull history.
//!
//! Pity reads and writes happen inside the caller's transaction so a pull
//! batch is linearizable per (player, banner). History is capped at 500
//! entries per player, trimmed oldest-first.

use sqlx::SqlitePool;

pub const HISTORY_CAP: i64 = 500;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoryRow {
    pub banner_id: String,
    pub hero_template_id: String,
    pub rarity: i64,
    pub created_at: String,
}

pub async fn get_pity(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    player_id: &str,
    banner_id: &str,
) -> Result<u32, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT counter FROM gacha_pity WHERE player_id = ? AND banner_id = ?")
            .bind(player_id)
            .bind(banner_id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(row.map(|(c,)| c as u32).unwrap_or(0))
}

pub async fn set_pity(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    player_id: &str,
    banner_id: &str,
    counter: u32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO gacha_pity (player_id, banner_id, counter) VALUES (?, ?, ?) \
         ON CONFLICT(player_id, banner_id) DO UPDATE SET counter = excluded.counter",
    )
    .bind(player_id)
    .bind(banner_id)
    .bind(counter as i64)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Read pity outside a pull (for the pity endpoint).
pub async fn peek_pity(
    pool: &SqlitePool,
    player_id: &str,
    banner_id: &str,
) -> Result<u32, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT counter FROM gacha_pity WHERE player_id = ? AND banner_id = ?")
            .bind(player_id)
            .bind(banner_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(c,)| c as u32).unwrap_or(0))
}

pub async fn record_pull(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    player_id: &str,
    banner_id: &str,
    hero_template_id: &str,
    rarity: u32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO gacha_history (player_id, banner_id, hero_template_id, rarity) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(player_id)
    .bind(banner_id)
    .bind(hero_template_id)
    .bind(rarity as i64)
    .execute(&mut **tx)
    .await?;
    // Trim the oldest rows beyond the cap
    sqlx::query(
        "DELETE FROM gacha_history WHERE player_id = ? AND id NOT IN \
         (SELECT id FROM gacha_history WHERE player_id = ? ORDER BY id DESC LIMIT ?)",
    )
    .bind(player_id)
    .bind(player_id)
    .bind(HISTORY_CAP)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Newest-first page of a player's pull history.
pub async fn history_page(
    pool: &SqlitePool,
    player_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<HistoryRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT banner_id, hero_template_id, rarity, created_at FROM gacha_history \
         WHERE player_id = ? ORDER BY id DESC LIMIT ? OFFSET ?",
    )
    .bind(player_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn history_count(pool: &SqlitePool, player_id: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM gacha_history WHERE player_id = ?")
        .bind(player_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
