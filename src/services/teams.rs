//! Team composition: creation, membership, formations, and power totals.

use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::catalog;
use crate::db::heroes as heroes_db;
use crate::db::teams as db;
use crate::error::{AppError, AppResult, Resource};
use crate::game::element::Element;
use crate::game::grid::GridPosition;
use crate::game::team::{Formation, Team, TeamSlot, MAX_TEAMS_PER_PLAYER};

#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub hero_id: String,
    pub name: String,
    pub element: Element,
    pub power: u64,
    pub x: u8,
    pub y: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamView {
    pub id: String,
    pub name: String,
    pub slot_number: u32,
    pub members: Vec<MemberView>,
    pub formation_id: Option<String>,
    pub formation_active: bool,
    pub total_power: u64,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct MemberInput {
    pub hero_id: String,
    pub x: u8,
    pub y: u8,
}

/// Load a team row plus members into the domain type, with hero metadata for
/// formation checks.
async fn load_team(
    pool: &SqlitePool,
    row: &db::TeamRow,
) -> AppResult<(Team, Vec<String>)> {
    let mut team = Team::new(
        &row.id,
        &row.player_id,
        &row.name,
        row.slot_number as u32,
        row.is_default != 0,
    );
    team.formation_id = row.formation_id.clone();

    let mut templates = Vec::new();
    for member in db::get_members(pool, &row.id).await? {
        let hero = heroes_db::get_hero_for_player(pool, &member.hero_id, &row.player_id)
            .await?
            .ok_or_else(|| AppError::NotFound(Resource::Hero, member.hero_id.clone()))?;
        let position = GridPosition::new(member.pos_x as u8, member.pos_y as u8)
            .ok_or_else(|| AppError::Internal("persisted position out of bounds".into()))?;
        let domain = crate::services::heroes::get(pool, &hero.id, &row.player_id).await?;
        team.add_member(TeamSlot {
            hero_id: hero.id.clone(),
            element: domain.element,
            power: domain.power,
            position,
        })?;
        templates.push(hero.template_id);
    }
    Ok((team, templates))
}

fn active_formation(team: &Team, templates: &[String]) -> Option<Formation> {
    let id = team.formation_id.as_deref()?;
    let formation = catalog::get_formation(id)?;
    formation.is_active_for(team, templates).then_some(formation)
}

async fn view_of(pool: &SqlitePool, row: &db::TeamRow) -> AppResult<TeamView> {
    let (team, templates) = load_team(pool, row).await?;
    let formation = active_formation(&team, &templates);
    let mut members = Vec::new();
    for slot in &team.members {
        let view = crate::services::heroes::get(pool, &slot.hero_id, &team.player_id).await?;
        members.push(MemberView {
            hero_id: slot.hero_id.clone(),
            name: view.name,
            element: slot.element,
            power: slot.power,
            x: slot.position.x,
            y: slot.position.y,
        });
    }
    Ok(TeamView {
        id: team.id.clone(),
        name: team.name.clone(),
        slot_number: team.slot_number,
        members,
        formation_id: team.formation_id.clone(),
        formation_active: formation.is_some(),
        total_power: team.total_power(formation.as_ref()),
        is_default: team.is_default,
    })
}

/// List teams, creating the default team on first touch.
pub async fn list(pool: &SqlitePool, player_id: &str) -> AppResult<Vec<TeamView>> {
    let mut rows = db::list_by_player(pool, player_id).await?;
    if rows.is_empty() {
        let id = Uuid::new_v4().to_string();
        db::create_team(pool, &id, player_id, "Đội Hình 1", 1, true).await?;
        rows = db::list_by_player(pool, player_id).await?;
    }
    let mut views = Vec::new();
    for row in &rows {
        views.push(view_of(pool, row).await?);
    }
    Ok(views)
}

async fn owned_row(pool: &SqlitePool, team_id: &str, player_id: &str) -> AppResult<db::TeamRow> {
    db::get_team_for_player(pool, team_id, player_id)
        .await?
        .ok_or_else(|| AppError::NotFound(Resource::Team, team_id.to_string()))
}

pub async fn get(pool: &SqlitePool, team_id: &str, player_id: &str) -> AppResult<TeamView> {
    let row = owned_row(pool, team_id, player_id).await?;
    view_of(pool, &row).await
}

pub async fn create(
    pool: &SqlitePool,
    player_id: &str,
    name: &str,
    is_default: bool,
) -> AppResult<TeamView> {
    let count = db::count_by_player(pool, player_id).await?;
    if count as usize >= MAX_TEAMS_PER_PLAYER {
        return Err(AppError::Validation(format!(
            "maximum number of teams ({MAX_TEAMS_PER_PLAYER}) reached"
        )));
    }
    if is_default {
        db::clear_default(pool, player_id).await?;
    }
    let id = Uuid::new_v4().to_string();
    db::create_team(pool, &id, player_id, name, count as u32 + 1, is_default).await?;
    get(pool, &id, player_id).await
}

/// Rename and/or replace the member list. Replacement validates the whole
/// new composition before writing.
pub async fn update(
    pool: &SqlitePool,
    team_id: &str,
    player_id: &str,
    name: Option<&str>,
    members: Option<&[MemberInput]>,
) -> AppResult<TeamView> {
    let row = owned_row(pool, team_id, player_id).await?;

    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("team name cannot be empty".into()));
        }
        db::rename_team(pool, team_id, name.trim()).await?;
    }

    if let Some(members) = members {
        let mut staged = Team::new(
            team_id,
            player_id,
            name.unwrap_or(&row.name),
            row.slot_number as u32,
            row.is_default != 0,
        );
        let mut to_store = Vec::new();
        for member in members {
            let hero = heroes_db::get_hero_for_player(pool, &member.hero_id, player_id)
                .await?
                .ok_or_else(|| AppError::NotFound(Resource::Hero, member.hero_id.clone()))?;
            let position = GridPosition::new(member.x, member.y)
                .ok_or_else(|| AppError::Validation("position outside the 3x3 grid".into()))?;
            let element = Element::parse(&hero.element).unwrap_or(Element::Kim);
            staged.add_member(TeamSlot {
                hero_id: hero.id.clone(),
                element,
                power: 0,
                position,
            })?;
            to_store.push((hero.id, member.x, member.y));
        }
        db::replace_members(pool, team_id, &to_store).await?;
    }

    get(pool, team_id, player_id).await
}

pub async fn delete(pool: &SqlitePool, team_id: &str, player_id: &str) -> AppResult<()> {
    let row = owned_row(pool, team_id, player_id).await?;
    if row.is_default != 0 {
        return Err(AppError::Team("cannot delete the default team".into()));
    }
    db::delete_team(pool, team_id).await?;
    Ok(())
}

pub async fn add_member(
    pool: &SqlitePool,
    team_id: &str,
    player_id: &str,
    member: &MemberInput,
) -> AppResult<TeamView> {
    let row = owned_row(pool, team_id, player_id).await?;
    let hero = heroes_db::get_hero_for_player(pool, &member.hero_id, player_id)
        .await?
        .ok_or_else(|| AppError::NotFound(Resource::Hero, member.hero_id.clone()))?;
    let position = GridPosition::new(member.x, member.y)
        .ok_or_else(|| AppError::Validation("position outside the 3x3 grid".into()))?;

    // Stage the change in the domain type so every invariant is checked
    // before anything is written
    let (mut team, _) = load_team(pool, &row).await?;
    team.add_member(TeamSlot {
        hero_id: hero.id.clone(),
        element: Element::parse(&hero.element).unwrap_or(Element::Kim),
        power: 0,
        position,
    })?;

    db::add_member(pool, team_id, &hero.id, member.x, member.y).await?;
    get(pool, team_id, player_id).await
}

pub async fn remove_member(
    pool: &SqlitePool,
    team_id: &str,
    player_id: &str,
    hero_id: &str,
) -> AppResult<TeamView> {
    owned_row(pool, team_id, player_id).await?;
    if !db::remove_member(pool, team_id, hero_id).await? {
        return Err(AppError::Team("hero is not in the team".into()));
    }
    get(pool, team_id, player_id).await
}

pub async fn update_formation(
    pool: &SqlitePool,
    team_id: &str,
    player_id: &str,
    formation_id: Option<&str>,
) -> AppResult<TeamView> {
    owned_row(pool, team_id, player_id).await?;
    if let Some(id) = formation_id {
        if catalog::get_formation(id).is_none() {
            return Err(AppError::Validation(format!("formation not found: {id}")));
        }
    }
    db::set_formation(pool, team_id, formation_id).await?;
    get(pool, team_id, player_id).await
}

pub fn formations() -> Vec<Formation> {
    catalog::all_formations()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::players::create_player;
    use crate::db::pool::test_pool;
    use crate::services::heroes::create_hero_from_template;

    async fn seed(pool: &SqlitePool) -> Vec<String> {
        create_player(pool, "p1", "user1", "u1@example.com", "hash", "Người Chơi")
            .await
            .unwrap();
        let mut ids = Vec::new();
        let mut tx = pool.begin().await.unwrap();
        for template in ["quan_vu", "truong_phi", "trieu_van", "luu_bi", "gia_cat_luong", "dan_binh"]
        {
            ids.push(create_hero_from_template(&mut tx, "p1", template).await.unwrap());
        }
        tx.commit().await.unwrap();
        ids
    }

    #[tokio::test]
    async fn first_list_creates_the_default_team() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        let teams = list(&pool, "p1").await.unwrap();
        assert_eq!(teams.len(), 1);
        assert!(teams[0].is_default);
        assert!(teams[0].members.is_empty());
    }

    #[tokio::test]
    async fn default_team_cannot_be_deleted() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        let teams = list(&pool, "p1").await.unwrap();
        let err = delete(&pool, &teams[0].id, "p1").await.unwrap_err();
        assert_eq!(err.code(), "TEAM_ERROR");

        let extra = create(&pool, "p1", "Đội Phụ", false).await.unwrap();
        delete(&pool, &extra.id, "p1").await.unwrap();
    }

    #[tokio::test]
    async fn member_invariants_are_enforced() {
        let (pool, _dir) = test_pool().await;
        let heroes = seed(&pool).await;
        let teams = list(&pool, "p1").await.unwrap();
        let team_id = teams[0].id.clone();

        add_member(&pool, &team_id, "p1", &MemberInput { hero_id: heroes[0].clone(), x: 0, y: 0 })
            .await
            .unwrap();
        // Same hero twice
        let err = add_member(
            &pool,
            &team_id,
            "p1",
            &MemberInput { hero_id: heroes[0].clone(), x: 1, y: 0 },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "TEAM_ERROR");
        // Same position twice
        let err = add_member(
            &pool,
            &team_id,
            "p1",
            &MemberInput { hero_id: heroes[1].clone(), x: 0, y: 0 },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "TEAM_ERROR");

        // Fill to five, then the sixth bounces with TEAM_FULL
        for (i, hero) in heroes[1..5].iter().enumerate() {
            add_member(
                &pool,
                &team_id,
                "p1",
                &MemberInput { hero_id: hero.clone(), x: (i + 1) as u8 % 3, y: (i + 1) as u8 / 3 },
            )
            .await
            .unwrap();
        }
        let err = add_member(
            &pool,
            &team_id,
            "p1",
            &MemberInput { hero_id: heroes[5].clone(), x: 2, y: 2 },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "TEAM_FULL");
    }

    #[tokio::test]
    async fn add_then_remove_is_a_noop() {
        let (pool, _dir) = test_pool().await;
        let heroes = seed(&pool).await;
        let teams = list(&pool, "p1").await.unwrap();
        let team_id = teams[0].id.clone();

        add_member(&pool, &team_id, "p1", &MemberInput { hero_id: heroes[0].clone(), x: 0, y: 0 })
            .await
            .unwrap();
        let view = remove_member(&pool, &team_id, "p1", &heroes[0]).await.unwrap();
        assert!(view.members.is_empty());
        assert_eq!(view.total_power, 0);

        let err = remove_member(&pool, &team_id, "p1", &heroes[0]).await.unwrap_err();
        assert_eq!(err.code(), "TEAM_ERROR");
    }

    #[tokio::test]
    async fn formation_activates_with_five_elements() {
        let (pool, _dir) = test_pool().await;
        let heroes = seed(&pool).await;
        let teams = list(&pool, "p1").await.unwrap();
        let team_id = teams[0].id.clone();

        // The first five seeded heroes cover all five elements
        for (i, hero) in heroes[..5].iter().enumerate() {
            add_member(
                &pool,
                &team_id,
                "p1",
                &MemberInput { hero_id: hero.clone(), x: i as u8 % 3, y: i as u8 / 3 },
            )
            .await
            .unwrap();
        }
        let view =
            update_formation(&pool, &team_id, "p1", Some("ngu_hanh_tran")).await.unwrap();
        assert!(view.formation_active);

        // Dropping a member deactivates it
        let view = remove_member(&pool, &team_id, "p1", &heroes[4]).await.unwrap();
        assert!(!view.formation_active);

        let err = update_formation(&pool, &team_id, "p1", Some("bat_quai")).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn team_cap_is_ten() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        list(&pool, "p1").await.unwrap(); // default team = 1
        for i in 2..=10 {
            create(&pool, "p1", &format!("Đội {i}"), false).await.unwrap();
        }
        let err = create(&pool, "p1", "Đội 11", false).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
