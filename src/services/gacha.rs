//! The gacha engine: banner pulls with pity, featured rate-up, and history.
//!
//! A pull batch runs inside one transaction: gems are charged up front, the
//! pity counter is read once and written once, and every result hero and
//! history row lands atomically. The RNG is seeded per batch and injectable
//! for tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::catalog::{self, BannerDef};
use crate::db::gacha as db;
use crate::db::heroes as heroes_db;
use crate::error::{AppError, AppResult, ResourceKind};
use crate::services::heroes::create_hero_from_template;

#[derive(Debug, Clone, Serialize)]
pub struct BannerView {
    pub id: String,
    pub name: String,
    pub rates: Vec<(u32, u32)>,
    pub pity_threshold: u32,
    pub cost_single: u64,
    pub cost_multi: u64,
    pub featured: Option<String>,
    pub featured_rate_up: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PityView {
    pub banner_id: String,
    pub current_pity: u32,
    pub pity_threshold: u32,
    pub pulls_until_guaranteed: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PullResult {
    pub hero_id: String,
    pub template_id: String,
    pub name: String,
    pub rarity: u32,
    pub is_new: bool,
    pub is_featured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PullOutcome {
    pub banner_id: String,
    pub pull_count: u32,
    pub gems_spent: u64,
    pub results: Vec<PullResult>,
    pub pity_counter: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub banner_id: String,
    pub template_id: String,
    pub rarity: u32,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub history: Vec<HistoryEntry>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

fn banner_view(banner: &BannerDef) -> BannerView {
    BannerView {
        id: banner.id.to_string(),
        name: banner.name.to_string(),
        rates: banner.rates.to_vec(),
        pity_threshold: banner.pity_threshold,
        cost_single: banner.cost_single,
        cost_multi: banner.cost_multi,
        featured: banner.featured.map(str::to_string),
        featured_rate_up: banner.featured_rate_up,
    }
}

pub fn banners() -> Vec<BannerView> {
    catalog::BANNERS.iter().map(banner_view).collect()
}

fn find_banner(banner_id: &str) -> AppResult<&'static BannerDef> {
    catalog::get_banner(banner_id)
        .ok_or_else(|| AppError::Gacha(format!("banner not found: {banner_id}")))
}

pub async fn pity(pool: &SqlitePool, player_id: &str, banner_id: &str) -> AppResult<PityView> {
    let banner = find_banner(banner_id)?;
    let current = db::peek_pity(pool, player_id, banner_id).await?;
    Ok(PityView {
        banner_id: banner_id.to_string(),
        current_pity: current,
        pity_threshold: banner.pity_threshold,
        pulls_until_guaranteed: banner.pity_threshold.saturating_sub(current),
    })
}

/// One rarity + template decision. Mutates the pity counter in place.
fn roll_one(
    banner: &BannerDef,
    rng: &mut ChaCha8Rng,
    pity_counter: &mut u32,
) -> (u32, &'static str, bool) {
    let rarity = if *pity_counter >= banner.pity_threshold.saturating_sub(1) {
        5
    } else {
        banner.rarity_for_roll(rng.gen::<f64>() * 100.0)
    };
    if rarity == 5 {
        *pity_counter = 0;
    } else {
        *pity_counter += 1;
    }

    let pool = catalog::pool_by_rarity(rarity);
    let mut is_featured = false;
    let template_id = if rarity == 5 && banner.featured.is_some() {
        let featured = banner.featured.expect("checked above");
        if rng.gen::<f64>() * 100.0 < banner.featured_rate_up as f64 {
            is_featured = true;
            featured
        } else {
            pool[rng.gen_range(0..pool.len())]
        }
    } else {
        pool[rng.gen_range(0..pool.len())]
    };
    if Some(template_id) == banner.featured {
        is_featured = true;
    }
    (rarity, template_id, is_featured)
}

/// Execute a pull batch. `seed` fixes the RNG for reproducible tests;
/// production callers pass `None`.
pub async fn pull(
    pool: &SqlitePool,
    player_id: &str,
    banner_id: &str,
    pull_count: u32,
    seed: Option<u64>,
) -> AppResult<PullOutcome> {
    if pull_count != 1 && pull_count != 10 {
        return Err(AppError::Gacha("invalid pull count, must be 1 or 10".into()));
    }
    let banner = find_banner(banner_id)?;
    let cost = if pull_count == 1 { banner.cost_single } else { banner.cost_multi };
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut tx = pool.begin().await?;

    // Charge once up front; the whole batch fails on insufficient gems
    if !crate::db::players::spend_resources(&mut *tx, player_id, 0, cost as i64, 0).await? {
        let available = crate::db::players::get_player(pool, player_id)
            .await?
            .map(|p| p.gems.max(0) as u64)
            .unwrap_or(0);
        return Err(AppError::InsufficientResources {
            kind: ResourceKind::Gems,
            required: cost,
            available,
        });
    }

    let mut pity_counter = db::get_pity(&mut tx, player_id, banner_id).await?;
    let mut results = Vec::with_capacity(pull_count as usize);
    for _ in 0..pull_count {
        let (rarity, template_id, is_featured) = roll_one(banner, &mut rng, &mut pity_counter);
        let is_new = !heroes_db::owns_template(&mut *tx, player_id, template_id).await?;
        let hero_id = create_hero_from_template(&mut tx, player_id, template_id).await?;
        db::record_pull(&mut tx, player_id, banner_id, template_id, rarity).await?;
        let name = catalog::get_hero_template(template_id)
            .map(|t| t.name.to_string())
            .unwrap_or_else(|| template_id.to_string());
        results.push(PullResult {
            hero_id,
            template_id: template_id.to_string(),
            name,
            rarity,
            is_new,
            is_featured,
        });
    }
    db::set_pity(&mut tx, player_id, banner_id, pity_counter).await?;
    tx.commit().await?;

    Ok(PullOutcome {
        banner_id: banner_id.to_string(),
        pull_count,
        gems_spent: cost,
        results,
        pity_counter,
    })
}

pub async fn history(
    pool: &SqlitePool,
    player_id: &str,
    page: i64,
    per_page: i64,
) -> AppResult<HistoryPage> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let rows = db::history_page(pool, player_id, per_page, (page - 1) * per_page).await?;
    let total = db::history_count(pool, player_id).await?;
    Ok(HistoryPage {
        history: rows
            .into_iter()
            .map(|row| HistoryEntry {
                banner_id: row.banner_id,
                template_id: row.hero_template_id,
                rarity: row.rarity as u32,
                timestamp: row.created_at,
            })
            .collect(),
        total,
        page,
        per_page,
    })
}
