//! Hero roster and progression: creation from templates, listing, level-up,
//! ascension, awakening, and equipment slots.

use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::catalog;
use crate::db::equipment as equipment_db;
use crate::db::heroes as db;
use crate::error::{AppError, AppResult, Resource};
use crate::game::element::Element;
use crate::game::equipment::EquipmentType;
use crate::game::hero::{
    ascension_requirement, compose_stats, max_level, EquipSlot, GrowthRates, Hero, LevelUpResult,
    MAX_ASCENSION, MAX_AWAKENING,
};
use crate::game::stats::HexagonStats;

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentSlots {
    pub weapon_id: Option<String>,
    pub armor_id: Option<String>,
    pub accessory_id: Option<String>,
    pub relic_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeroView {
    pub id: String,
    pub template_id: String,
    pub name: String,
    pub element: Element,
    pub rarity: u32,
    pub level: u32,
    pub exp: u64,
    pub max_level: u32,
    pub stars: u32,
    pub ascension_level: u32,
    pub awakening_level: u32,
    pub stats: HexagonStats,
    pub power: u64,
    pub equipment: EquipmentSlots,
    pub skills: Vec<String>,
    pub is_locked: bool,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeroPage {
    pub heroes: Vec<HeroView>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Clone)]
pub struct ExpItem {
    pub item_id: String,
    pub quantity: u32,
}

impl ExpItem {
    /// Exp granted per unit of this item.
    fn exp_each(&self) -> u64 {
        match self.item_id.as_str() {
            "kinh_nghiem_dan_lon" => 500,
            "kinh_nghiem_dan_vua" => 250,
            _ => 100,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelUpOutcome {
    pub hero_id: String,
    pub old_level: u32,
    pub new_level: u32,
    pub leveled_up: bool,
    pub exp_remaining: u64,
    pub stats: HexagonStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct AscendOutcome {
    pub hero_id: String,
    pub old_ascension_level: u32,
    pub new_ascension_level: u32,
    pub new_level_cap: u32,
    pub unlocked_passive: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AwakenOutcome {
    pub hero_id: String,
    pub old_awakening_level: u32,
    pub new_awakening_level: u32,
    pub stat_boost_percent: u32,
    pub unlocked_ability: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EquipOutcome {
    pub hero_id: String,
    pub slot: EquipSlot,
    pub equipped_id: Option<String>,
    pub unequipped_id: Option<String>,
    pub stats: HexagonStats,
}

/// Create an owned hero from a catalog template inside a transaction, so
/// gacha batches stay atomic. Level-1 stats are the template base.
pub async fn create_hero_from_template(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    player_id: &str,
    template_id: &str,
) -> AppResult<String> {
    let template = catalog::get_hero_template(template_id)
        .ok_or_else(|| AppError::Validation(format!("template not found: {template_id}")))?;
    let hero_id = Uuid::new_v4().to_string();
    db::insert_hero(
        &mut **tx,
        &hero_id,
        player_id,
        template.id,
        template.element.as_str(),
        template.rarity,
        template.rarity,
        &template.base_stats,
    )
    .await?;
    for skill_id in template.skills {
        db::insert_hero_skill(&mut **tx, &hero_id, skill_id, 1).await?;
    }
    Ok(hero_id)
}

fn growth_for(template_id: &str) -> GrowthRates {
    catalog::get_hero_template(template_id)
        .map(|t| t.growth)
        .unwrap_or_else(GrowthRates::flat)
}

/// Rebuild the domain hero from its row. Stored stats are the grown base;
/// awakening and equipment are composed on demand.
fn domain_hero(row: &db::HeroRow) -> Hero {
    let element = Element::parse(&row.element).unwrap_or(Element::Kim);
    let name = catalog::get_hero_template(&row.template_id)
        .map(|t| t.name.to_string())
        .unwrap_or_else(|| row.template_id.clone());
    Hero {
        id: row.id.clone(),
        player_id: row.player_id.clone(),
        template_id: row.template_id.clone(),
        name,
        element,
        rarity: row.rarity as u32,
        level: row.level as u32,
        exp: row.exp as u64,
        stars: row.stars as u32,
        ascension_level: row.ascension_level as u32,
        awakening_level: row.awakening_level as u32,
        base_stats: row.base_stats(),
        growth_rates: growth_for(&row.template_id),
        weapon_id: row.weapon_id.clone(),
        armor_id: row.armor_id.clone(),
        accessory_id: row.accessory_id.clone(),
        relic_id: row.relic_id.clone(),
        mount_id: row.mount_id.clone(),
        is_locked: row.is_locked != 0,
        is_favorite: row.is_favorite != 0,
    }
}

/// Total stats of one equipped piece: template base plus enhancement bonus.
async fn equipped_piece_stats(
    pool: &SqlitePool,
    player_id: &str,
    equipment_id: &str,
) -> AppResult<Option<HexagonStats>> {
    let Some(row) = equipment_db::get_equipment_for_player(pool, equipment_id, player_id).await?
    else {
        return Ok(None);
    };
    let base = catalog::get_equipment_template(&row.template_id)
        .map(|t| t.base_stats)
        .unwrap_or_default();
    Ok(Some(base.add(&row.bonus_stats())))
}

pub async fn equipped_stats(pool: &SqlitePool, hero: &Hero) -> AppResult<Vec<HexagonStats>> {
    let mut out = Vec::new();
    for id in [&hero.weapon_id, &hero.armor_id, &hero.accessory_id, &hero.relic_id]
        .into_iter()
        .flatten()
    {
        if let Some(stats) = equipped_piece_stats(pool, &hero.player_id, id).await? {
            out.push(stats);
        }
    }
    Ok(out)
}

async fn view_of(pool: &SqlitePool, row: &db::HeroRow) -> AppResult<HeroView> {
    let hero = domain_hero(row);
    let equipment_stats = equipped_stats(pool, &hero).await?;
    let stats = compose_stats(
        &hero.base_stats,
        &GrowthRates::flat(), // growth already folded into stored base
        1,
        hero.awakening_level,
        &equipment_stats,
    );
    let skills = db::get_hero_skills(pool, &hero.id)
        .await?
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    Ok(HeroView {
        id: hero.id.clone(),
        template_id: hero.template_id.clone(),
        name: hero.name.clone(),
        element: hero.element,
        rarity: hero.rarity,
        level: hero.level,
        exp: hero.exp,
        max_level: hero.max_level(),
        stars: hero.stars,
        ascension_level: hero.ascension_level,
        awakening_level: hero.awakening_level,
        stats,
        power: hero.power(),
        equipment: EquipmentSlots {
            weapon_id: hero.weapon_id.clone(),
            armor_id: hero.armor_id.clone(),
            accessory_id: hero.accessory_id.clone(),
            relic_id: hero.relic_id.clone(),
        },
        skills,
        is_locked: hero.is_locked,
        is_favorite: hero.is_favorite,
    })
}

pub async fn list(
    pool: &SqlitePool,
    player_id: &str,
    element: Option<Element>,
    rarity: Option<u32>,
    page: i64,
    per_page: i64,
) -> AppResult<HeroPage> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let element_str = element.map(|e| e.as_str());
    let rows = db::list_by_player(
        pool,
        player_id,
        element_str,
        rarity,
        per_page,
        (page - 1) * per_page,
    )
    .await?;
    let total = db::count_by_player(pool, player_id, element_str, rarity).await?;
    let mut heroes = Vec::with_capacity(rows.len());
    for row in &rows {
        heroes.push(view_of(pool, row).await?);
    }
    Ok(HeroPage { heroes, total, page, per_page })
}

async fn owned_row(pool: &SqlitePool, hero_id: &str, player_id: &str) -> AppResult<db::HeroRow> {
    db::get_hero_for_player(pool, hero_id, player_id)
        .await?
        .ok_or_else(|| AppError::NotFound(Resource::Hero, hero_id.to_string()))
}

pub async fn get(pool: &SqlitePool, hero_id: &str, player_id: &str) -> AppResult<HeroView> {
    let row = owned_row(pool, hero_id, player_id).await?;
    view_of(pool, &row).await
}

/// Consume exp items, run the level curve, regrow stats, persist.
pub async fn level_up(
    pool: &SqlitePool,
    hero_id: &str,
    player_id: &str,
    exp_items: &[ExpItem],
) -> AppResult<LevelUpOutcome> {
    let row = owned_row(pool, hero_id, player_id).await?;
    let mut hero = domain_hero(&row);

    if hero.level >= max_level(hero.ascension_level) {
        return Err(AppError::HeroMaxLevel);
    }

    let total_exp: u64 = exp_items.iter().map(|i| i.exp_each() * i.quantity as u64).sum();
    let old_stats = hero.base_stats;
    let result: LevelUpResult = hero.gain_exp(total_exp);

    let new_stats = if result.leveled_up {
        let grown = crate::game::hero::apply_growth(
            &old_stats,
            &hero.growth_rates,
            result.new_level - result.old_level,
        );
        hero.base_stats = grown;
        grown
    } else {
        old_stats
    };

    db::update_progress(pool, hero_id, hero.level, hero.exp, &new_stats).await?;

    Ok(LevelUpOutcome {
        hero_id: hero_id.to_string(),
        old_level: result.old_level,
        new_level: result.new_level,
        leveled_up: result.leveled_up,
        exp_remaining: result.exp_remaining,
        stats: new_stats,
    })
}

pub async fn ascend(pool: &SqlitePool, hero_id: &str, player_id: &str) -> AppResult<AscendOutcome> {
    let row = owned_row(pool, hero_id, player_id).await?;
    let hero = domain_hero(&row);

    if hero.ascension_level >= MAX_ASCENSION {
        return Err(AppError::Hero("hero is already at max ascension level".into()));
    }
    let required = ascension_requirement(hero.ascension_level);
    if hero.level < required {
        return Err(AppError::Hero(format!(
            "ascension requires level {required}, hero is level {}",
            hero.level
        )));
    }

    let new_ascension = hero.ascension_level + 1;
    db::update_ascension(pool, hero_id, new_ascension).await?;

    let unlocked_passive = match new_ascension {
        1 => Some("noi_tai_cap_1".to_string()),
        2 => Some("noi_tai_cap_2".to_string()),
        _ => None,
    };

    Ok(AscendOutcome {
        hero_id: hero_id.to_string(),
        old_ascension_level: hero.ascension_level,
        new_ascension_level: new_ascension,
        new_level_cap: max_level(new_ascension),
        unlocked_passive,
    })
}

pub async fn awaken(pool: &SqlitePool, hero_id: &str, player_id: &str) -> AppResult<AwakenOutcome> {
    let row = owned_row(pool, hero_id, player_id).await?;
    let hero = domain_hero(&row);

    if hero.awakening_level >= MAX_AWAKENING {
        return Err(AppError::Hero("hero is already at max awakening level".into()));
    }
    let new_awakening = hero.awakening_level + 1;
    db::update_awakening(pool, hero_id, new_awakening).await?;

    let unlocked_ability = match new_awakening {
        1 => Some("skill_variant".to_string()),
        3 => Some("transformation".to_string()),
        _ => None,
    };

    Ok(AwakenOutcome {
        hero_id: hero_id.to_string(),
        old_awakening_level: hero.awakening_level,
        new_awakening_level: new_awakening,
        stat_boost_percent: new_awakening * 10,
        unlocked_ability,
    })
}

/// Equip a piece: ownership, slot/type match, and level/element requirements
/// are all verified before a transaction swaps the slot and both equipped-by
/// markers.
pub async fn equip(
    pool: &SqlitePool,
    hero_id: &str,
    player_id: &str,
    equipment_id: &str,
    slot: EquipSlot,
) -> AppResult<EquipOutcome> {
    let row = owned_row(pool, hero_id, player_id).await?;
    let hero = domain_hero(&row);

    let piece = equipment_db::get_equipment_for_player(pool, equipment_id, player_id)
        .await?
        .ok_or_else(|| AppError::NotFound(Resource::Equipment, equipment_id.to_string()))?;
    let template = catalog::get_equipment_template(&piece.template_id)
        .ok_or_else(|| AppError::Equipment(format!("template not found: {}", piece.template_id)))?;

    let slot_type = match slot {
        EquipSlot::Weapon => EquipmentType::Weapon,
        EquipSlot::Armor => EquipmentType::Armor,
        EquipSlot::Accessory => EquipmentType::Accessory,
        EquipSlot::Relic => EquipmentType::Relic,
    };
    if template.equipment_type != slot_type {
        return Err(AppError::Equipment(format!(
            "{} does not fit the {} slot",
            template.name,
            slot.as_str()
        )));
    }
    if hero.level < template.required_level {
        return Err(AppError::Equipment(format!(
            "requires hero level {}, hero is level {}",
            template.required_level, hero.level
        )));
    }
    if let Some(required) = template.required_element {
        if hero.element != required {
            return Err(AppError::Equipment(format!(
                "requires a {} hero",
                required.display_name()
            )));
        }
    }
    if piece.equipped_by.as_deref().is_some_and(|h| h != hero_id) {
        return Err(AppError::Equipment("equipment is equipped by another hero".into()));
    }

    let previous = hero.equipped_in(slot).map(str::to_string);
    let mut tx = pool.begin().await?;
    if let Some(prev_id) = &previous {
        equipment_db::set_equipped_by(&mut tx, prev_id, None).await?;
    }
    db::set_equipment_slot(&mut tx, hero_id, slot, Some(equipment_id)).await?;
    equipment_db::set_equipped_by(&mut tx, equipment_id, Some(hero_id)).await?;
    tx.commit().await?;

    let row = owned_row(pool, hero_id, player_id).await?;
    let view = view_of(pool, &row).await?;
    Ok(EquipOutcome {
        hero_id: hero_id.to_string(),
        slot,
        equipped_id: Some(equipment_id.to_string()),
        unequipped_id: previous,
        stats: view.stats,
    })
}

pub async fn unequip(
    pool: &SqlitePool,
    hero_id: &str,
    player_id: &str,
    slot: EquipSlot,
) -> AppResult<EquipOutcome> {
    let row = owned_row(pool, hero_id, player_id).await?;
    let hero = domain_hero(&row);
    let previous = hero.equipped_in(slot).map(str::to_string);

    if let Some(prev_id) = &previous {
        let mut tx = pool.begin().await?;
        equipment_db::set_equipped_by(&mut tx, prev_id, None).await?;
        db::set_equipment_slot(&mut tx, hero_id, slot, None).await?;
        tx.commit().await?;
    }

    let row = owned_row(pool, hero_id, player_id).await?;
    let view = view_of(pool, &row).await?;
    Ok(EquipOutcome {
        hero_id: hero_id.to_string(),
        slot,
        equipped_id: None,
        unequipped_id: previous,
        stats: view.stats,
    })
}
