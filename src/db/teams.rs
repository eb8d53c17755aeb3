//! Team rows and their member slots.

use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamRow {
    pub id: String,
    pub player_id: String,
    pub name: String,
    pub slot_number: i64,
    pub formation_id: Option<String>,
    pub is_default: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamMemberRow {
    pub team_id: String,
    pub hero_id: String,
    pub pos_x: i64,
    pub pos_y: i64,
}

pub async fn create_team(
    pool: &SqlitePool,
    id: &str,
    player_id: &str,
    name: &str,
    slot_number: u32,
    is_default: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO teams (id, player_id, name, slot_number, is_default) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(player_id)
    .bind(name)
    .bind(slot_number as i64)
    .bind(is_default as i64)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_team_for_player(
    pool: &SqlitePool,
    team_id: &str,
    player_id: &str,
) -> Result<Option<TeamRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM teams WHERE id = ? AND player_id = ?")
        .bind(team_id)
        .bind(player_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_player(
    pool: &SqlitePool,
    player_id: &str,
) -> Result<Vec<TeamRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM teams WHERE player_id = ? ORDER BY slot_number")
        .bind(player_id)
        .fetch_all(pool)
        .await
}

pub async fn count_by_player(pool: &SqlitePool, player_id: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams WHERE player_id = ?")
        .bind(player_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn rename_team(pool: &SqlitePool, team_id: &str, name: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE teams SET name = ? WHERE id = ?")
        .bind(name)
        .bind(team_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Clear the default flag on every team of a player (before promoting a new
/// default).
pub async fn clear_default(pool: &SqlitePool, player_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE teams SET is_default = 0 WHERE player_id = ?")
        .bind(player_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_formation(
    pool: &SqlitePool,
    team_id: &str,
    formation_id: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE teams SET formation_id = ? WHERE id = ?")
        .bind(formation_id)
        .bind(team_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_team(pool: &SqlitePool, team_id: &str) -> Result<(), sqlx::Error> {
    // Members cascade
    sqlx::query("DELETE FROM teams WHERE id = ?")
        .bind(team_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_members(
    pool: &SqlitePool,
    team_id: &str,
) -> Result<Vec<TeamMemberRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM team_members WHERE team_id = ? ORDER BY pos_y, pos_x",
    )
    .bind(team_id)
    .fetch_all(pool)
    .await
}

pub async fn add_member(
    pool: &SqlitePool,
    team_id: &str,
    hero_id: &str,
    pos_x: u8,
    pos_y: u8,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO team_members (team_id, hero_id, pos_x, pos_y) VALUES (?, ?, ?, ?)")
        .bind(team_id)
        .bind(hero_id)
        .bind(pos_x as i64)
        .bind(pos_y as i64)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn remove_member(
    pool: &SqlitePool,
    team_id: &str,
    hero_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM team_members WHERE team_id = ? AND hero_id = ?")
        .bind(team_id)
        .bind(hero_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Replace the whole member list atomically.
pub async fn replace_members(
    pool: &SqlitePool,
    team_id: &str,
    members: &[(String, u8, u8)],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM team_members WHERE team_id = ?")
        .bind(team_id)
        .execute(&mut *tx)
        .await?;
    for (hero_id, x, y) in members {
        sqlx::query("INSERT INTO team_members (team_id, hero_id, pos_x, pos_y) VALUES (?, ?, ?, ?)")
            .bind(team_id)
            .bind(hero_id)
            .bind(*x as i64)
            .bind(*y as i64)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::heroes::insert_hero;
    use crate::db::players::create_player;
    use crate::db::pool::test_pool;
    use crate::game::stats::HexagonStats;

    async fn seed(pool: &SqlitePool) {
        create_player(pool, "p1", "user1", "u1@example.com", "hash", "Người Chơi")
            .await
            .unwrap();
        let stats = HexagonStats::new(1000, 120, 80, 95, 15, 10);
        insert_hero(pool, "h1", "p1", "quan_vu", "kim", 5, 5, &stats).await.unwrap();
        insert_hero(pool, "h2", "p1", "truong_phi", "hoa", 5, 5, &stats).await.unwrap();
        create_team(pool, "t1", "p1", "Đội Chính", 1, true).await.unwrap();
    }

    #[tokio::test]
    async fn create_list_and_delete() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;

        let teams = list_by_player(&pool, "p1").await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].is_default, 1);

        create_team(&pool, "t2", "p1", "Đội Phụ", 2, false).await.unwrap();
        assert_eq!(count_by_player(&pool, "p1").await.unwrap(), 2);

        delete_team(&pool, "t2").await.unwrap();
        assert_eq!(count_by_player(&pool, "p1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn members_cascade_on_team_delete() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        add_member(&pool, "t1", "h1", 0, 0).await.unwrap();
        add_member(&pool, "t1", "h2", 1, 0).await.unwrap();
        assert_eq!(get_members(&pool, "t1").await.unwrap().len(), 2);

        delete_team(&pool, "t1").await.unwrap();
        assert!(get_members(&pool, "t1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_position_is_rejected_by_schema() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        add_member(&pool, "t1", "h1", 0, 0).await.unwrap();
        assert!(add_member(&pool, "t1", "h2", 0, 0).await.is_err());
    }

    #[tokio::test]
    async fn replace_members_swaps_the_roster() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        add_member(&pool, "t1", "h1", 0, 0).await.unwrap();

        replace_members(&pool, "t1", &[("h2".into(), 1, 1)]).await.unwrap();
        let members = get_members(&pool, "t1").await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].hero_id, "h2");
        assert_eq!(members[0].pos_x, 1);
    }
}
