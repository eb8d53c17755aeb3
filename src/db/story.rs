//! Story progress rows: cleared stages and best star ratings.

use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProgressRow {
    pub stage_id: String,
    pub stars: i64,
}

/// Record a stage clear. Stars only ever improve. Returns true when this was
/// the first clear.
pub async fn record_clear(
    pool: &SqlitePool,
    player_id: &str,
    stage_id: &str,
    stars: u8,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT stars FROM story_progress WHERE player_id = ? AND stage_id = ?")
            .bind(player_id)
            .bind(stage_id)
            .fetch_optional(&mut *tx)
            .await?;
    let first_clear = existing.is_none();
    sqlx::query(
        "INSERT INTO story_progress (player_id, stage_id, stars) VALUES (?, ?, ?) \
         ON CONFLICT(player_id, stage_id) DO UPDATE SET stars = MAX(stars, excluded.stars)",
    )
    .bind(player_id)
    .bind(stage_id)
    .bind(stars as i64)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(first_clear)
}

pub async fn get_progress(
    pool: &SqlitePool,
    player_id: &str,
) -> Result<Vec<ProgressRow>, sqlx::Error> {
    sqlx::query_as("SELECT stage_id, stars FROM story_progress WHERE player_id = ?")
        .bind(player_id)
        .fetch_all(pool)
        .await
}

pub async fn is_cleared(
    pool: &SqlitePool,
    player_id: &str,
    stage_id: &str,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM story_progress WHERE player_id = ? AND stage_id = ?")
            .bind(player_id)
            .bind(stage_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::players::create_player;
    use crate::db::pool::test_pool;

    #[tokio::test]
    async fn first_clear_then_repeat() {
        let (pool, _dir) = test_pool().await;
        create_player(&pool, "p1", "user1", "u1@example.com", "hash", "Người Chơi")
            .await
            .unwrap();

        assert!(record_clear(&pool, "p1", "stage_1_1", 2).await.unwrap());
        assert!(!record_clear(&pool, "p1", "stage_1_1", 1).await.unwrap());
        assert!(is_cleared(&pool, "p1", "stage_1_1").await.unwrap());
        assert!(!is_cleared(&pool, "p1", "stage_1_2").await.unwrap());
    }

    #[tokio::test]
    async fn stars_only_improve() {
        let (pool, _dir) = test_pool().await;
        create_player(&pool, "p1", "user1", "u1@example.com", "hash", "Người Chơi")
            .await
            .unwrap();

        record_clear(&pool, "p1", "stage_1_1", 2).await.unwrap();
        record_clear(&pool, "p1", "stage_1_1", 1).await.unwrap();
        let progress = get_progress(&pool, "p1").await.unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].stars, 2);

        record_clear(&pool, "p1", "stage_1_1", 3).await.unwrap();
        let progress = get_progress(&pool, "p1").await.unwrap();
        assert_eq!(progress[0].stars, 3);
    }
}
