//! Equipment ownership rows. Type and rarity are denormalized from the
//! template for SQL-side filtering; base stats stay in the catalog.

use sqlx::SqlitePool;

use crate::game::stats::HexagonStats;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EquipmentRow {
    pub id: String,
    pub player_id: String,
    pub template_id: String,
    pub equipment_type: String,
    pub rarity: String,
    pub level: i64,
    pub bonus_hp: i64,
    pub bonus_atk: i64,
    pub bonus_def: i64,
    pub bonus_spd: i64,
    pub bonus_crit: i64,
    pub bonus_dex: i64,
    pub equipped_by: Option<String>,
    pub is_locked: i64,
}

impl EquipmentRow {
    pub fn bonus_stats(&self) -> HexagonStats {
        HexagonStats::new(
            self.bonus_hp as u32,
            self.bonus_atk as u32,
            self.bonus_def as u32,
            self.bonus_spd as u32,
            self.bonus_crit as u32,
            self.bonus_dex as u32,
        )
    }
}

pub async fn insert_equipment(
    pool: &SqlitePool,
    id: &str,
    player_id: &str,
    template_id: &str,
    equipment_type: &str,
    rarity: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO equipment (id, player_id, template_id, equipment_type, rarity) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(player_id)
    .bind(template_id)
    .bind(equipment_type)
    .bind(rarity)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_equipment_for_player(
    pool: &SqlitePool,
    equipment_id: &str,
    player_id: &str,
) -> Result<Option<EquipmentRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM equipment WHERE id = ? AND player_id = ?")
        .bind(equipment_id)
        .bind(player_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_player(
    pool: &SqlitePool,
    player_id: &str,
    equipment_type: Option<&str>,
    rarity: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<EquipmentRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM equipment \
         WHERE player_id = ? \
           AND (? IS NULL OR equipment_type = ?) \
           AND (? IS NULL OR rarity = ?) \
         ORDER BY level DESC, created_at ASC \
         LIMIT ? OFFSET ?",
    )
    .bind(player_id)
    .bind(equipment_type)
    .bind(equipment_type)
    .bind(rarity)
    .bind(rarity)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_by_player(
    pool: &SqlitePool,
    player_id: &str,
    equipment_type: Option<&str>,
    rarity: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM equipment \
         WHERE player_id = ? \
           AND (? IS NULL OR equipment_type = ?) \
           AND (? IS NULL OR rarity = ?)",
    )
    .bind(player_id)
    .bind(equipment_type)
    .bind(equipment_type)
    .bind(rarity)
    .bind(rarity)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn update_enhancement(
    pool: &SqlitePool,
    equipment_id: &str,
    level: u32,
    bonus: &HexagonStats,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE equipment SET level = ?, \
         bonus_hp = ?, bonus_atk = ?, bonus_def = ?, bonus_spd = ?, bonus_crit = ?, bonus_dex = ? \
         WHERE id = ?",
    )
    .bind(level as i64)
    .bind(bonus.hp as i64)
    .bind(bonus.atk as i64)
    .bind(bonus.def as i64)
    .bind(bonus.spd as i64)
    .bind(bonus.crit as i64)
    .bind(bonus.dex as i64)
    .bind(equipment_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Record which hero carries the piece, inside an open transaction.
pub async fn set_equipped_by(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    equipment_id: &str,
    hero_id: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE equipment SET equipped_by = ? WHERE id = ?")
        .bind(hero_id)
        .bind(equipment_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Delete several pieces at once (fusion consumption). Returns how many rows
/// actually belonged to the player and were removed.
pub async fn delete_many(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    player_id: &str,
    equipment_ids: &[String],
) -> Result<u64, sqlx::Error> {
    let mut deleted = 0;
    for id in equipment_ids {
        let result = sqlx::query("DELETE FROM equipment WHERE id = ? AND player_id = ?")
            .bind(id)
            .bind(player_id)
            .execute(&mut **tx)
            .await?;
        deleted += result.rows_affected();
    }
    Ok(deleted)
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
        insert_equipment(pool, "eq1", "p1", "thiet_kiem", "weapon", "common").await.unwrap();
        insert_equipment(pool, "eq2", "p1", "da_giap", "armor", "common").await.unwrap();
        insert_equipment(pool, "eq3", "p1", "thanh_long_dao", "weapon", "legendary")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_filters_by_type_and_rarity() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;

        let weapons = list_by_player(&pool, "p1", Some("weapon"), None, 20, 0).await.unwrap();
        assert_eq!(weapons.len(), 2);
        let legendary = list_by_player(&pool, "p1", None, Some("legendary"), 20, 0).await.unwrap();
        assert_eq!(legendary.len(), 1);
        assert_eq!(legendary[0].id, "eq3");
        assert_eq!(count_by_player(&pool, "p1", None, None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn enhancement_persists() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;

        let bonus = HexagonStats::new(0, 5, 0, 1, 0, 0);
        update_enhancement(&pool, "eq1", 2, &bonus).await.unwrap();
        let row = get_equipment_for_player(&pool, "eq1", "p1").await.unwrap().unwrap();
        assert_eq!(row.level, 2);
        assert_eq!(row.bonus_atk, 5);
        assert_eq!(row.bonus_stats(), bonus);
    }

    #[tokio::test]
    async fn delete_many_only_touches_owned_rows() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        create_player(&pool, "p2", "user2", "u2@example.com", "hash", "Khác").await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let deleted = delete_many(&mut tx, "p2", &["eq1".into(), "eq2".into()]).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(deleted, 0);
        assert!(get_equipment_for_player(&pool, "eq1", "p1").await.unwrap().is_some());

        let mut tx = pool.begin().await.unwrap();
        let deleted = delete_many(&mut tx, "p1", &["eq1".into(), "eq2".into()]).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(deleted, 2);
        assert!(get_equipment_for_player(&pool, "eq1", "p1").await.unwrap().is_none());
    }
}
