//! Mirror the static catalog into the database so ownership rows can hold
//! foreign keys against it. Inserts are idempotent.

use sqlx::SqlitePool;

use crate::catalog;
use crate::game::skill::SkillKind;

pub async fn seed_catalog(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for template in catalog::HERO_TEMPLATES {
        sqlx::query(
            "INSERT OR IGNORE INTO hero_templates (id, name, element, rarity) VALUES (?, ?, ?, ?)",
        )
        .bind(template.id)
        .bind(template.name)
        .bind(template.element.as_str())
        .bind(template.rarity as i64)
        .execute(pool)
        .await?;
    }

    for skill_id in catalog::skills::all_skill_ids() {
        let spec = catalog::get_skill_spec(skill_id).expect("listed skill exists");
        let kind = match spec.kind {
            SkillKind::Damage => "damage",
            SkillKind::Heal => "heal",
            SkillKind::Buff => "buff",
            SkillKind::Debuff => "debuff",
        };
        sqlx::query("INSERT OR IGNORE INTO skill_templates (id, name, kind) VALUES (?, ?, ?)")
            .bind(skill_id)
            .bind(&spec.name)
            .bind(kind)
            .execute(pool)
            .await?;
    }

    for template in catalog::equipment::EQUIPMENT_TEMPLATES {
        sqlx::query(
            "INSERT OR IGNORE INTO equipment_templates (id, name, equipment_type, rarity) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(template.id)
        .bind(template.name)
        .bind(template.equipment_type.as_str())
        .bind(template.rarity.as_str())
        .execute(pool)
        .await?;
    }

    for set in catalog::equipment::EQUIPMENT_SETS {
        sqlx::query("INSERT OR IGNORE INTO equipment_sets (id, name) VALUES (?, ?)")
            .bind(set.id)
            .bind(set.name)
            .execute(pool)
            .await?;
    }

    for chapter in catalog::CHAPTERS {
        sqlx::query("INSERT OR IGNORE INTO chapters (id, chapter_number, title) VALUES (?, ?, ?)")
            .bind(chapter.id)
            .bind(chapter.chapter_number as i64)
            .bind(chapter.title)
            .execute(pool)
            .await?;
        for stage in chapter.stages {
            sqlx::query(
                "INSERT OR IGNORE INTO stages \
                 (id, chapter_id, stage_number, name, difficulty, stamina_cost) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(stage.id)
            .bind(chapter.id)
            .bind(stage.stage_number as i64)
            .bind(stage.name)
            .bind(stage.difficulty as i64)
            .bind(stage.stamina_cost as i64)
            .execute(pool)
            .await?;
            for enemy in stage.enemies {
                if let Some(boss) = &enemy.boss {
                    sqlx::query(
                        "INSERT OR IGNORE INTO bosses (id, stage_id, name, title) \
                         VALUES (?, ?, ?, ?)",
                    )
                    .bind(enemy.template_id)
                    .bind(stage.id)
                    .bind(enemy.name)
                    .bind(boss.title)
                    .execute(pool)
                    .await?;
                }
            }
        }
    }

    Ok(())
}
