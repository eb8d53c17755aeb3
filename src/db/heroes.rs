//! Hero ownership rows. Element and rarity are denormalized from the
//! template at creation so listing filters stay in SQL.

use sqlx::SqlitePool;

use crate::game::stats::HexagonStats;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HeroRow {
    pub id: String,
    pub player_id: String,
    pub template_id: String,
    pub element: String,
    pub rarity: i64,
    pub level: i64,
    pub exp: i64,
    pub stars: i64,
    pub ascension_level: i64,
    pub awakening_level: i64,
    pub hp: i64,
    pub atk: i64,
    pub def: i64,
    pub spd: i64,
    pub crit: i64,
    pub dex: i64,
    pub weapon_id: Option<String>,
    pub armor_id: Option<String>,
    pub accessory_id: Option<String>,
    pub relic_id: Option<String>,
    pub mount_id: Option<String>,
    pub is_locked: i64,
    pub is_favorite: i64,
}

impl HeroRow {
    pub fn base_stats(&self) -> HexagonStats {
        HexagonStats::new(
            self.hp as u32,
            self.atk as u32,
            self.def as u32,
            self.spd as u32,
            self.crit as u32,
            self.dex as u32,
        )
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_hero<'e, E>(
    executor: E,
    id: &str,
    player_id: &str,
    template_id: &str,
    element: &str,
    rarity: u32,
    stars: u32,
    stats: &HexagonStats,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO heroes \
         (id, player_id, template_id, element, rarity, stars, hp, atk, def, spd, crit, dex) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(player_id)
    .bind(template_id)
    .bind(element)
    .bind(rarity as i64)
    .bind(stars as i64)
    .bind(stats.hp as i64)
    .bind(stats.atk as i64)
    .bind(stats.def as i64)
    .bind(stats.spd as i64)
    .bind(stats.crit as i64)
    .bind(stats.dex as i64)
    .execute(executor)
    .await?;
    Ok(())
}

/// Fetch a hero only when it belongs to the player; ownership misses look
/// identical to missing rows.
pub async fn get_hero_for_player(
    pool: &SqlitePool,
    hero_id: &str,
    player_id: &str,
) -> Result<Option<HeroRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM heroes WHERE id = ? AND player_id = ?")
        .bind(hero_id)
        .bind(player_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_player(
    pool: &SqlitePool,
    player_id: &str,
    element: Option<&str>,
    rarity: Option<u32>,
    limit: i64,
    offset: i64,
) -> Result<Vec<HeroRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM heroes \
         WHERE player_id = ? \
           AND (? IS NULL OR element = ?) \
           AND (? IS NULL OR rarity = ?) \
         ORDER BY rarity DESC, level DESC, created_at ASC \
         LIMIT ? OFFSET ?",
    )
    .bind(player_id)
    .bind(element)
    .bind(element)
    .bind(rarity.map(|r| r as i64))
    .bind(rarity.map(|r| r as i64))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_by_player(
    pool: &SqlitePool,
    player_id: &str,
    element: Option<&str>,
    rarity: Option<u32>,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM heroes \
         WHERE player_id = ? \
           AND (? IS NULL OR element = ?) \
           AND (? IS NULL OR rarity = ?)",
    )
    .bind(player_id)
    .bind(element)
    .bind(element)
    .bind(rarity.map(|r| r as i64))
    .bind(rarity.map(|r| r as i64))
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Does the player already own any hero of this template? Drives the gacha
/// `is_new` flag; takes any executor so pull batches can ask mid-transaction.
pub async fn owns_template<'e, E>(
    executor: E,
    player_id: &str,
    template_id: &str,
) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM heroes WHERE player_id = ? AND template_id = ? LIMIT 1")
            .bind(player_id)
            .bind(template_id)
            .fetch_optional(executor)
            .await?;
    Ok(row.is_some())
}

pub async fn update_progress(
    pool: &SqlitePool,
    hero_id: &str,
    level: u32,
    exp: u64,
    stats: &HexagonStats,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE heroes SET level = ?, exp = ?, hp = ?, atk = ?, def = ?, spd = ?, crit = ?, dex = ? \
         WHERE id = ?",
    )
    .bind(level as i64)
    .bind(exp as i64)
    .bind(stats.hp as i64)
    .bind(stats.atk as i64)
    .bind(stats.def as i64)
    .bind(stats.spd as i64)
    .bind(stats.crit as i64)
    .bind(stats.dex as i64)
    .bind(hero_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_ascension(
    pool: &SqlitePool,
    hero_id: &str,
    ascension_level: u32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE heroes SET ascension_level = ? WHERE id = ?")
        .bind(ascension_level as i64)
        .bind(hero_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Stored stats stay the grown base; awakening is folded in when stats are
/// composed for display or battle.
pub async fn update_awakening(
    pool: &SqlitePool,
    hero_id: &str,
    awakening_level: u32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE heroes SET awakening_level = ? WHERE id = ?")
        .bind(awakening_level as i64)
        .bind(hero_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Set or clear one equipment slot inside an open transaction.
pub async fn set_equipment_slot(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    hero_id: &str,
    slot: crate::game::hero::EquipSlot,
    equipment_id: Option<&str>,
) -> Result<(), sqlx::Error> {
    use crate::game::hero::EquipSlot;
    let column = match slot {
        EquipSlot::Weapon => "weapon_id",
        EquipSlot::Armor => "armor_id",
        EquipSlot::Accessory => "accessory_id",
        EquipSlot::Relic => "relic_id",
    };
    let sql = format!("UPDATE heroes SET {column} = ? WHERE id = ?");
    sqlx::query(&sql)
        .bind(equipment_id)
        .bind(hero_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn get_hero_skills(
    pool: &SqlitePool,
    hero_id: &str,
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as("SELECT skill_id, level FROM hero_skills WHERE hero_id = ? ORDER BY skill_id")
        .bind(hero_id)
        .fetch_all(pool)
        .await
}

pub async fn insert_hero_skill<'e, E>(
    executor: E,
    hero_id: &str,
    skill_id: &str,
    level: u32,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query("INSERT OR IGNORE INTO hero_skills (hero_id, skill_id, level) VALUES (?, ?, ?)")
        .bind(hero_id)
        .bind(skill_id)
        .bind(level as i64)
        .execute(executor)
        .await?;
    Ok(())
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
        let stats = HexagonStats::new(1000, 120, 80, 95, 15, 10);
        insert_hero(pool, "h1", "p1", "quan_vu", "kim", 5, 5, &stats).await.unwrap();
        insert_hero(pool, "h2", "p1", "dan_binh", "moc", 3, 3, &stats).await.unwrap();
    }

    #[tokio::test]
    async fn ownership_scoping() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        assert!(get_hero_for_player(&pool, "h1", "p1").await.unwrap().is_some());
        assert!(get_hero_for_player(&pool, "h1", "p2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_element_and_rarity() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;

        let all = list_by_player(&pool, "p1", None, None, 20, 0).await.unwrap();
        assert_eq!(all.len(), 2);
        let kim = list_by_player(&pool, "p1", Some("kim"), None, 20, 0).await.unwrap();
        assert_eq!(kim.len(), 1);
        assert_eq!(kim[0].template_id, "quan_vu");
        let five_star = count_by_player(&pool, "p1", None, Some(5)).await.unwrap();
        assert_eq!(five_star, 1);
    }

    #[tokio::test]
    async fn owns_template_drives_is_new() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        assert!(owns_template(&pool, "p1", "quan_vu").await.unwrap());
        assert!(!owns_template(&pool, "p1", "trieu_van").await.unwrap());
    }

    #[tokio::test]
    async fn progress_update_persists_stats() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        let stats = HexagonStats::new(1100, 130, 85, 96, 16, 11);
        update_progress(&pool, "h1", 3, 20, &stats).await.unwrap();
        let hero = get_hero_for_player(&pool, "h1", "p1").await.unwrap().unwrap();
        assert_eq!(hero.level, 3);
        assert_eq!(hero.exp, 20);
        assert_eq!(hero.hp, 1100);
    }

    #[tokio::test]
    async fn equipment_slot_set_and_clear() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;

        use crate::game::hero::EquipSlot;
        let mut tx = pool.begin().await.unwrap();
        set_equipment_slot(&mut tx, "h1", EquipSlot::Weapon, Some("eq1")).await.unwrap();
        tx.commit().await.unwrap();
        let hero = get_hero_for_player(&pool, "h1", "p1").await.unwrap().unwrap();
        assert_eq!(hero.weapon_id.as_deref(), Some("eq1"));

        let mut tx = pool.begin().await.unwrap();
        set_equipment_slot(&mut tx, "h1", EquipSlot::Weapon, None).await.unwrap();
        tx.commit().await.unwrap();
        let hero = get_hero_for_player(&pool, "h1", "p1").await.unwrap().unwrap();
        assert!(hero.weapon_id.is_none());
    }
}
