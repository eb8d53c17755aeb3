//! Equipment listing, enhancement, and fusion.

use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::catalog;
use crate::db::equipment as db;
use crate::error::{AppError, AppResult, Resource};
use crate::game::equipment::{Equipment, EquipmentType, Rarity};
use crate::game::stats::HexagonStats;
use crate::services::players;

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentView {
    pub id: String,
    pub template_id: String,
    pub name: String,
    pub equipment_type: EquipmentType,
    pub rarity: Rarity,
    pub level: u32,
    pub max_level: u32,
    pub base_stats: HexagonStats,
    pub bonus_stats: HexagonStats,
    pub total_stats: HexagonStats,
    pub power: u64,
    pub set_id: Option<String>,
    pub unique_effect: Option<String>,
    pub equipped_by: Option<String>,
    pub is_locked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentPage {
    pub equipment: Vec<EquipmentView>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnhanceOutcome {
    pub equipment_id: String,
    pub old_level: u32,
    pub new_level: u32,
    pub gold_spent: u64,
    pub stats_gained: HexagonStats,
    pub total_stats: HexagonStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct FuseOutcome {
    pub result: EquipmentView,
    pub consumed: Vec<String>,
}

/// Rebuild the domain entity from a row and its template.
fn domain_equipment(row: &db::EquipmentRow) -> AppResult<Equipment> {
    let template = catalog::get_equipment_template(&row.template_id)
        .ok_or_else(|| AppError::Equipment(format!("template not found: {}", row.template_id)))?;
    Ok(Equipment {
        id: row.id.clone(),
        player_id: row.player_id.clone(),
        template_id: row.template_id.clone(),
        name: template.name.to_string(),
        equipment_type: template.equipment_type,
        rarity: template.rarity,
        level: row.level as u32,
        base_stats: template.base_stats,
        bonus_stats: row.bonus_stats(),
        set_id: template.set_id.map(str::to_string),
        unique_effect: template.unique_effect.map(str::to_string),
        required_level: template.required_level,
        required_element: template.required_element,
        equipped_by: row.equipped_by.clone(),
        is_locked: row.is_locked != 0,
    })
}

fn view_of(row: &db::EquipmentRow) -> AppResult<EquipmentView> {
    let eq = domain_equipment(row)?;
    Ok(EquipmentView {
        id: eq.id.clone(),
        template_id: eq.template_id.clone(),
        name: eq.name.clone(),
        equipment_type: eq.equipment_type,
        rarity: eq.rarity,
        level: eq.level,
        max_level: eq.max_level(),
        base_stats: eq.base_stats,
        bonus_stats: eq.bonus_stats,
        total_stats: eq.total_stats(),
        power: eq.power_rating(),
        set_id: eq.set_id.clone(),
        unique_effect: eq.unique_effect.clone(),
        equipped_by: eq.equipped_by.clone(),
        is_locked: eq.is_locked,
    })
}

pub async fn list(
    pool: &SqlitePool,
    player_id: &str,
    equipment_type: Option<EquipmentType>,
    rarity: Option<Rarity>,
    page: i64,
    per_page: i64,
) -> AppResult<EquipmentPage> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let type_str = equipment_type.map(|t| t.as_str());
    let rarity_str = rarity.map(|r| r.as_str());
    let rows = db::list_by_player(
        pool,
        player_id,
        type_str,
        rarity_str,
        per_page,
        (page - 1) * per_page,
    )
    .await?;
    let total = db::count_by_player(pool, player_id, type_str, rarity_str).await?;
    let equipment = rows.iter().map(view_of).collect::<AppResult<Vec<_>>>()?;
    Ok(EquipmentPage { equipment, total, page, per_page })
}

async fn owned_row(
    pool: &SqlitePool,
    equipment_id: &str,
    player_id: &str,
) -> AppResult<db::EquipmentRow> {
    db::get_equipment_for_player(pool, equipment_id, player_id)
        .await?
        .ok_or_else(|| AppError::NotFound(Resource::Equipment, equipment_id.to_string()))
}

pub async fn get(
    pool: &SqlitePool,
    equipment_id: &str,
    player_id: &str,
) -> AppResult<EquipmentView> {
    let row = owned_row(pool, equipment_id, player_id).await?;
    view_of(&row)
}

/// Grant a fresh piece from a template (battle drops, fusion results).
pub async fn grant_from_template(
    pool: &SqlitePool,
    player_id: &str,
    template_id: &str,
) -> AppResult<String> {
    let template = catalog::get_equipment_template(template_id)
        .ok_or_else(|| AppError::Equipment(format!("template not found: {template_id}")))?;
    let id = Uuid::new_v4().to_string();
    db::insert_equipment(
        pool,
        &id,
        player_id,
        template.id,
        template.equipment_type.as_str(),
        template.rarity.as_str(),
    )
    .await?;
    Ok(id)
}

/// Enhance one level. Gold cost is catalog-driven: current level times the
/// template's per-level factor.
pub async fn enhance(
    pool: &SqlitePool,
    equipment_id: &str,
    player_id: &str,
) -> AppResult<EnhanceOutcome> {
    let row = owned_row(pool, equipment_id, player_id).await?;
    let mut eq = domain_equipment(&row)?;

    if !eq.can_enhance() {
        return Err(AppError::Equipment(format!(
            "already at max level {} for {} rarity",
            eq.max_level(),
            eq.rarity.as_str()
        )));
    }

    let cost_factor = catalog::get_equipment_template(&eq.template_id)
        .map(|t| t.enhance_cost_per_level)
        .unwrap_or(100);
    let gold_cost = eq.level as u64 * cost_factor;
    players::spend_resources(pool, player_id, gold_cost as i64, 0, 0).await?;

    let outcome = eq.enhance().expect("can_enhance checked above");
    db::update_enhancement(pool, equipment_id, eq.level, &eq.bonus_stats).await?;

    Ok(EnhanceOutcome {
        equipment_id: equipment_id.to_string(),
        old_level: outcome.new_level - 1,
        new_level: outcome.new_level,
        gold_spent: gold_cost,
        stats_gained: outcome.stats_gained,
        total_stats: eq.total_stats(),
    })
}

/// Fuse two or more pieces into one. The highest-power input decides the
/// result template; inputs are deleted and the result starts at level 1.
pub async fn fuse(
    pool: &SqlitePool,
    player_id: &str,
    equipment_ids: &[String],
) -> AppResult<FuseOutcome> {
    if equipment_ids.len() < 2 {
        return Err(AppError::Equipment(
            "at least 2 equipment pieces are required for fusion".into(),
        ));
    }
    let distinct: std::collections::HashSet<&String> = equipment_ids.iter().collect();
    if distinct.len() != equipment_ids.len() {
        return Err(AppError::Equipment("duplicate equipment in fusion input".into()));
    }

    let mut inputs = Vec::new();
    for id in equipment_ids {
        let row = owned_row(pool, id, player_id).await?;
        if row.equipped_by.is_some() {
            return Err(AppError::Equipment(format!("{id} is currently equipped")));
        }
        if row.is_locked != 0 {
            return Err(AppError::Equipment(format!("{id} is locked")));
        }
        inputs.push(domain_equipment(&row)?);
    }

    let best = inputs
        .iter()
        .max_by_key(|e| e.power_rating())
        .expect("inputs checked non-empty");
    let result_template = best.template_id.clone();

    let mut tx = pool.begin().await?;
    let deleted = db::delete_many(&mut tx, player_id, equipment_ids).await?;
    if deleted != equipment_ids.len() as u64 {
        // A concurrent mutation stole an input; abort wholesale
        return Err(AppError::Equipment("fusion inputs changed, retry".into()));
    }
    let template = catalog::get_equipment_template(&result_template)
        .ok_or_else(|| AppError::Equipment(format!("template not found: {result_template}")))?;
    let result_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO equipment (id, player_id, template_id, equipment_type, rarity) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&result_id)
    .bind(player_id)
    .bind(template.id)
    .bind(template.equipment_type.as_str())
    .bind(template.rarity.as_str())
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    let result = get(pool, &result_id, player_id).await?;
    Ok(FuseOutcome { result, consumed: equipment_ids.to_vec() })
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
    async fn enhance_spends_gold_and_raises_stats() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        let id = grant_from_template(&pool, "p1", "thiet_kiem").await.unwrap();

        let outcome = enhance(&pool, &id, "p1").await.unwrap();
        assert_eq!(outcome.old_level, 1);
        assert_eq!(outcome.new_level, 2);
        // level 1 * 100 gold
        assert_eq!(outcome.gold_spent, 100);
        // floor(0.1 * 25 atk) = 2
        assert_eq!(outcome.stats_gained.atk, 2);

        let resources = players::get_resources(&pool, "p1").await.unwrap();
        assert_eq!(resources.gold, 900);
    }

    #[tokio::test]
    async fn enhance_stops_at_rarity_cap() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        crate::db::players::add_resources(&pool, "p1", 1_000_000, 0, 0).await.unwrap();
        let id = grant_from_template(&pool, "p1", "thiet_kiem").await.unwrap();

        for _ in 0..9 {
            enhance(&pool, &id, "p1").await.unwrap();
        }
        let err = enhance(&pool, &id, "p1").await.unwrap_err();
        assert_eq!(err.code(), "EQUIPMENT_ERROR");
        let view = get(&pool, &id, "p1").await.unwrap();
        assert_eq!(view.level, 10);
    }

    #[tokio::test]
    async fn enhance_without_gold_fails_cleanly() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        let id = grant_from_template(&pool, "p1", "thiet_kiem").await.unwrap();
        // Drain the wallet
        crate::db::players::spend_resources(&pool, "p1", 1000, 0, 0).await.unwrap();

        let err = enhance(&pool, &id, "p1").await.unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_GOLD");
        let view = get(&pool, &id, "p1").await.unwrap();
        assert_eq!(view.level, 1);
    }

    #[tokio::test]
    async fn fuse_consumes_inputs_and_produces_result() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        let a = grant_from_template(&pool, "p1", "thiet_kiem").await.unwrap();
        let b = grant_from_template(&pool, "p1", "bat_xa_mau").await.unwrap();

        let outcome = fuse(&pool, "p1", &[a.clone(), b.clone()]).await.unwrap();
        // The epic mâu out-powers the common kiếm
        assert_eq!(outcome.result.template_id, "bat_xa_mau");
        assert_eq!(outcome.result.level, 1);
        assert!(get(&pool, &a, "p1").await.is_err());
        assert!(get(&pool, &b, "p1").await.is_err());
    }

    #[tokio::test]
    async fn fuse_requires_two_unequipped_pieces() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        let a = grant_from_template(&pool, "p1", "thiet_kiem").await.unwrap();

        let err = fuse(&pool, "p1", &[a.clone()]).await.unwrap_err();
        assert_eq!(err.code(), "EQUIPMENT_ERROR");
        let err = fuse(&pool, "p1", &[a.clone(), a.clone()]).await.unwrap_err();
        assert_eq!(err.code(), "EQUIPMENT_ERROR");
    }

    #[tokio::test]
    async fn list_pages_and_filters() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        grant_from_template(&pool, "p1", "thiet_kiem").await.unwrap();
        grant_from_template(&pool, "p1", "da_giap").await.unwrap();
        grant_from_template(&pool, "p1", "thanh_long_dao").await.unwrap();

        let all = list(&pool, "p1", None, None, 1, 10).await.unwrap();
        assert_eq!(all.total, 3);
        let weapons = list(&pool, "p1", Some(EquipmentType::Weapon), None, 1, 10).await.unwrap();
        assert_eq!(weapons.total, 2);
        let legendary = list(&pool, "p1", None, Some(Rarity::Legendary), 1, 10).await.unwrap();
        assert_eq!(legendary.total, 1);
        assert_eq!(legendary.equipment[0].name, "Thanh Long Yển Nguyệt Đao");
    }
}
