//! Player profile and resource accounting.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::players as db;
use crate::error::{AppError, AppResult, Resource, ResourceKind};

/// Exp for a player (account) level.
fn required_player_exp(level: i64) -> i64 {
    level * 1000
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub username: String,
    pub email: String,
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

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Resources {
    pub gold: i64,
    pub gems: i64,
    pub stamina: i64,
    pub max_stamina: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlayerLevelUp {
    pub old_level: i64,
    pub new_level: i64,
    pub leveled_up: bool,
    pub current_exp: i64,
}

pub async fn get_player(pool: &SqlitePool, player_id: &str) -> AppResult<PlayerView> {
    let row = db::get_player(pool, player_id)
        .await?
        .ok_or_else(|| AppError::NotFound(Resource::Player, player_id.to_string()))?;
    Ok(PlayerView {
        id: row.id,
        username: row.username,
        email: row.email,
        display_name: row.display_name,
        level: row.level,
        exp: row.exp,
        gold: row.gold,
        gems: row.gems,
        stamina: row.stamina,
        max_stamina: row.max_stamina,
        vip_level: row.vip_level,
        created_at: row.created_at,
        last_login: row.last_login,
    })
}

pub async fn get_resources(pool: &SqlitePool, player_id: &str) -> AppResult<Resources> {
    let player = get_player(pool, player_id).await?;
    Ok(Resources {
        gold: player.gold,
        gems: player.gems,
        stamina: player.stamina,
        max_stamina: player.max_stamina,
    })
}

/// Debit resources, naming the first short balance in the error. The actual
/// debit is a single guarded statement, so a concurrent spend can never push
/// a balance negative.
pub async fn spend_resources(
    pool: &SqlitePool,
    player_id: &str,
    gold: i64,
    gems: i64,
    stamina: i64,
) -> AppResult<Resources> {
    if db::spend_resources(pool, player_id, gold, gems, stamina).await? {
        return get_resources(pool, player_id).await;
    }
    // Guarded update refused: report which balance was short
    let current = get_resources(pool, player_id).await?;
    if current.gold < gold {
        return Err(AppError::InsufficientResources {
            kind: ResourceKind::Gold,
            required: gold as u64,
            available: current.gold.max(0) as u64,
        });
    }
    if current.gems < gems {
        return Err(AppError::InsufficientResources {
            kind: ResourceKind::Gems,
            required: gems as u64,
            available: current.gems.max(0) as u64,
        });
    }
    if current.stamina < stamina {
        return Err(AppError::InsufficientResources {
            kind: ResourceKind::Stamina,
            required: stamina as u64,
            available: current.stamina.max(0) as u64,
        });
    }
    // The balance recovered between the update and the re-read; surface a
    // retryable failure rather than silently spending twice.
    Err(AppError::Internal("resource debit raced, retry".into()))
}

pub async fn add_resources(
    pool: &SqlitePool,
    player_id: &str,
    gold: i64,
    gems: i64,
    stamina: i64,
) -> AppResult<Resources> {
    // Ensure the player exists so a credit cannot vanish silently
    let _ = get_player(pool, player_id).await?;
    db::add_resources(pool, player_id, gold, gems, stamina).await?;
    get_resources(pool, player_id).await
}

/// Account exp: loop the level curve and persist the result.
pub async fn add_experience(
    pool: &SqlitePool,
    player_id: &str,
    amount: i64,
) -> AppResult<PlayerLevelUp> {
    let player = get_player(pool, player_id).await?;
    let old_level = player.level;
    let mut level = player.level;
    let mut exp = player.exp + amount;
    while exp >= required_player_exp(level) {
        exp -= required_player_exp(level);
        level += 1;
    }
    if level != old_level || exp != player.exp {
        db::update_level_exp(pool, player_id, level, exp).await?;
    }
    Ok(PlayerLevelUp {
        old_level,
        new_level: level,
        leveled_up: level > old_level,
        current_exp: exp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::players::create_player;
    use crate::db::pool::test_pool;

    async fn seed(pool: &SqlitePool) {
        create_player(pool, "p1", "user1", "u1@example.com", "hash", "Người Chơi")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_player_is_not_found() {
        let (pool, _dir) = test_pool().await;
        let err = get_player(&pool, "ghost").await.unwrap_err();
        assert_eq!(err.code(), "PLAYER_NOT_FOUND");
    }

    #[tokio::test]
    async fn spend_names_the_short_resource() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;

        let err = spend_resources(&pool, "p1", 0, 500, 0).await.unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_GEMS");

        let err = spend_resources(&pool, "p1", 0, 0, 500).await.unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_STAMINA");

        // A valid spend goes through
        let resources = spend_resources(&pool, "p1", 100, 10, 5).await.unwrap();
        assert_eq!(resources.gold, 900);
        assert_eq!(resources.gems, 90);
        assert_eq!(resources.stamina, 95);
    }

    #[tokio::test]
    async fn experience_levels_the_account() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;

        // Level 1 needs 1000, level 2 needs 2000
        let result = add_experience(&pool, "p1", 2500).await.unwrap();
        assert!(result.leveled_up);
        assert_eq!(result.new_level, 2);
        assert_eq!(result.current_exp, 1500);

        let result = add_experience(&pool, "p1", 500).await.unwrap();
        assert!(result.leveled_up);
        assert_eq!(result.new_level, 3);
        assert_eq!(result.current_exp, 0);

        let player = get_player(&pool, "p1").await.unwrap();
        assert_eq!(player.level, 3);
    }
}
