//! Story progression: chapter/stage unlock gating, stage starts, and clear
//! rewards.

use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::catalog::{self, ChapterDef, StageDef};
use crate::db::story as db;
use crate::error::{AppError, AppResult, Resource};
use crate::services::players;

#[derive(Debug, Clone, Serialize)]
pub struct ChapterSummary {
    pub id: String,
    pub chapter_number: u32,
    pub title: String,
    pub description: String,
    pub is_mythical: bool,
    pub is_unlocked: bool,
    pub stage_count: usize,
    pub stages_cleared: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageSummary {
    pub id: String,
    pub stage_number: u32,
    pub name: String,
    pub difficulty: u32,
    pub recommended_power: u64,
    pub stamina_cost: u64,
    pub waves: u32,
    pub is_boss_stage: bool,
    pub is_unlocked: bool,
    pub cleared: bool,
    pub stars: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterDetail {
    pub id: String,
    pub chapter_number: u32,
    pub title: String,
    pub description: String,
    pub is_mythical: bool,
    pub stages: Vec<StageSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RewardBundle {
    pub gold: u64,
    pub gems: u64,
    pub exp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageView {
    pub id: String,
    pub chapter_id: String,
    pub chapter_title: String,
    pub stage_number: u32,
    pub name: String,
    pub difficulty: u32,
    pub recommended_power: u64,
    pub stamina_cost: u64,
    pub waves: u32,
    pub is_boss_stage: bool,
    pub first_clear_rewards: RewardBundle,
    pub repeat_rewards: RewardBundle,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageStart {
    pub stage_id: String,
    pub team_id: String,
    pub stamina_spent: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageClear {
    pub stage_id: String,
    pub stars: u8,
    pub first_clear: bool,
    pub rewards: RewardBundle,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressSummary {
    pub total_stages: usize,
    pub cleared_stages: usize,
    pub total_stars: u64,
}

async fn progress_map(pool: &SqlitePool, player_id: &str) -> AppResult<HashMap<String, u8>> {
    Ok(db::get_progress(pool, player_id)
        .await?
        .into_iter()
        .map(|row| (row.stage_id, row.stars as u8))
        .collect())
}

fn chapter_cleared(chapter: &ChapterDef, progress: &HashMap<String, u8>) -> bool {
    chapter.stages.iter().all(|s| progress.contains_key(s.id))
}

/// Chapter n is open iff it is the first or chapter n-1 is fully cleared.
fn chapter_unlocked(chapter: &ChapterDef, progress: &HashMap<String, u8>) -> bool {
    if chapter.chapter_number == 1 {
        return true;
    }
    catalog::get_chapter_by_number(chapter.chapter_number - 1)
        .map(|previous| chapter_cleared(previous, progress))
        .unwrap_or(false)
}

/// A stage is open iff its chapter is open and it is first or follows a
/// cleared stage.
fn stage_unlocked(
    chapter: &ChapterDef,
    stage: &StageDef,
    progress: &HashMap<String, u8>,
) -> bool {
    if !chapter_unlocked(chapter, progress) {
        return false;
    }
    if stage.stage_number == 1 {
        return true;
    }
    chapter
        .stages
        .iter()
        .find(|s| s.stage_number == stage.stage_number - 1)
        .map(|previous| progress.contains_key(previous.id))
        .unwrap_or(false)
}

pub async fn chapters(pool: &SqlitePool, player_id: &str) -> AppResult<Vec<ChapterSummary>> {
    let progress = progress_map(pool, player_id).await?;
    Ok(catalog::CHAPTERS
        .iter()
        .map(|chapter| ChapterSummary {
            id: chapter.id.to_string(),
            chapter_number: chapter.chapter_number,
            title: chapter.title.to_string(),
            description: chapter.description.to_string(),
            is_mythical: chapter.is_mythical,
            is_unlocked: chapter_unlocked(chapter, &progress),
            stage_count: chapter.stages.len(),
            stages_cleared: chapter
                .stages
                .iter()
                .filter(|s| progress.contains_key(s.id))
                .count(),
        })
        .collect())
}

pub async fn chapter_detail(
    pool: &SqlitePool,
    player_id: &str,
    chapter_id: &str,
) -> AppResult<ChapterDetail> {
    let chapter = catalog::get_chapter(chapter_id)
        .ok_or_else(|| AppError::NotFound(Resource::Chapter, chapter_id.to_string()))?;
    let progress = progress_map(pool, player_id).await?;
    Ok(ChapterDetail {
        id: chapter.id.to_string(),
        chapter_number: chapter.chapter_number,
        title: chapter.title.to_string(),
        description: chapter.description.to_string(),
        is_mythical: chapter.is_mythical,
        stages: chapter
            .stages
            .iter()
            .map(|stage| StageSummary {
                id: stage.id.to_string(),
                stage_number: stage.stage_number,
                name: stage.name.to_string(),
                difficulty: stage.difficulty,
                recommended_power: stage.recommended_power,
                stamina_cost: stage.stamina_cost,
                waves: stage.waves,
                is_boss_stage: stage.is_boss_stage,
                is_unlocked: stage_unlocked(chapter, stage, &progress),
                cleared: progress.contains_key(stage.id),
                stars: progress.get(stage.id).copied().unwrap_or(0),
            })
            .collect(),
    })
}

fn bundle(rewards: catalog::stages::StageRewards) -> RewardBundle {
    RewardBundle { gold: rewards.gold, gems: rewards.gems, exp: rewards.exp }
}

pub fn stage_view(stage_id: &str) -> AppResult<StageView> {
    let (chapter, stage) = catalog::get_stage(stage_id)
        .ok_or_else(|| AppError::NotFound(Resource::Stage, stage_id.to_string()))?;
    Ok(StageView {
        id: stage.id.to_string(),
        chapter_id: chapter.id.to_string(),
        chapter_title: chapter.title.to_string(),
        stage_number: stage.stage_number,
        name: stage.name.to_string(),
        difficulty: stage.difficulty,
        recommended_power: stage.recommended_power,
        stamina_cost: stage.stamina_cost,
        waves: stage.waves,
        is_boss_stage: stage.is_boss_stage,
        first_clear_rewards: bundle(catalog::first_clear_rewards(stage)),
        repeat_rewards: bundle(catalog::repeat_rewards(stage)),
    })
}

/// Gate and debit a stage start. The battle itself is started by the battle
/// service off the returned intent.
pub async fn start_stage(
    pool: &SqlitePool,
    player_id: &str,
    stage_id: &str,
    team_id: &str,
) -> AppResult<StageStart> {
    let (chapter, stage) = catalog::get_stage(stage_id)
        .ok_or_else(|| AppError::NotFound(Resource::Stage, stage_id.to_string()))?;
    let progress = progress_map(pool, player_id).await?;
    if !stage_unlocked(chapter, stage, &progress) {
        return Err(AppError::Validation(format!("stage is locked: {stage_id}")));
    }

    players::spend_resources(pool, player_id, 0, 0, stage.stamina_cost as i64).await?;

    Ok(StageStart {
        stage_id: stage_id.to_string(),
        team_id: team_id.to_string(),
        stamina_spent: stage.stamina_cost,
    })
}

/// Record a clear and pay out: first-clear rewards once, repeat rewards
/// after.
pub async fn complete_stage(
    pool: &SqlitePool,
    player_id: &str,
    stage_id: &str,
    stars: u8,
) -> AppResult<StageClear> {
    let (_, stage) = catalog::get_stage(stage_id)
        .ok_or_else(|| AppError::NotFound(Resource::Stage, stage_id.to_string()))?;
    let stars = stars.min(3);

    let first_clear = db::record_clear(pool, player_id, stage_id, stars).await?;
    let rewards = if first_clear {
        bundle(catalog::first_clear_rewards(stage))
    } else {
        bundle(catalog::repeat_rewards(stage))
    };

    players::add_resources(pool, player_id, rewards.gold as i64, rewards.gems as i64, 0).await?;
    players::add_experience(pool, player_id, rewards.exp as i64).await?;

    Ok(StageClear { stage_id: stage_id.to_string(), stars, first_clear, rewards })
}

pub async fn progress(pool: &SqlitePool, player_id: &str) -> AppResult<ProgressSummary> {
    let progress = progress_map(pool, player_id).await?;
    let total_stages = catalog::CHAPTERS.iter().map(|c| c.stages.len()).sum();
    Ok(ProgressSummary {
        total_stages,
        cleared_stages: progress.len(),
        total_stars: progress.values().map(|s| *s as u64).sum(),
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
    async fn only_first_chapter_and_stage_start_unlocked() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;

        let chapters = chapters(&pool, "p1").await.unwrap();
        assert!(chapters[0].is_unlocked);
        assert!(!chapters[1].is_unlocked);

        let detail = chapter_detail(&pool, "p1", "chapter_1").await.unwrap();
        assert!(detail.stages[0].is_unlocked);
        assert!(!detail.stages[1].is_unlocked);
    }

    #[tokio::test]
    async fn clearing_unlocks_the_next_stage_and_chapter() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;

        complete_stage(&pool, "p1", "stage_1_1", 3).await.unwrap();
        let detail = chapter_detail(&pool, "p1", "chapter_1").await.unwrap();
        assert!(detail.stages[1].is_unlocked);
        assert!(!detail.stages[2].is_unlocked);

        complete_stage(&pool, "p1", "stage_1_2", 2).await.unwrap();
        complete_stage(&pool, "p1", "stage_1_3", 3).await.unwrap();
        let all = super::chapters(&pool, "p1").await.unwrap();
        assert!(all[1].is_unlocked);
    }

    #[tokio::test]
    async fn first_clear_pays_more_than_repeat() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;

        let first = complete_stage(&pool, "p1", "stage_1_1", 3).await.unwrap();
        assert!(first.first_clear);
        assert_eq!(first.rewards.gold, 500);
        assert_eq!(first.rewards.gems, 10);

        let repeat = complete_stage(&pool, "p1", "stage_1_1", 3).await.unwrap();
        assert!(!repeat.first_clear);
        assert_eq!(repeat.rewards.gold, 100);
        assert_eq!(repeat.rewards.gems, 0);

        let resources = players::get_resources(&pool, "p1").await.unwrap();
        assert_eq!(resources.gold, 1000 + 500 + 100);
        assert_eq!(resources.gems, 100 + 10);
    }

    #[tokio::test]
    async fn start_stage_debits_stamina_and_gates_locked_stages() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;

        let start = start_stage(&pool, "p1", "stage_1_1", "t1").await.unwrap();
        assert_eq!(start.stamina_spent, 10);
        let resources = players::get_resources(&pool, "p1").await.unwrap();
        assert_eq!(resources.stamina, 90);

        let err = start_stage(&pool, "p1", "stage_1_3", "t1").await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = start_stage(&pool, "p1", "stage_9_9", "t1").await.unwrap_err();
        assert_eq!(err.code(), "STAGE_NOT_FOUND");
    }

    #[tokio::test]
    async fn stamina_exhaustion_blocks_starts() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        crate::db::players::spend_resources(&pool, "p1", 0, 0, 95).await.unwrap();

        let err = start_stage(&pool, "p1", "stage_1_1", "t1").await.unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_STAMINA");
    }

    #[tokio::test]
    async fn progress_sums_stars() {
        let (pool, _dir) = test_pool().await;
        seed(&pool).await;
        complete_stage(&pool, "p1", "stage_1_1", 2).await.unwrap();
        complete_stage(&pool, "p1", "stage_1_2", 3).await.unwrap();

        let summary = progress(&pool, "p1").await.unwrap();
        assert_eq!(summary.cleared_stages, 2);
        assert_eq!(summary.total_stars, 5);
        assert_eq!(summary.total_stages, 5);
    }
}
