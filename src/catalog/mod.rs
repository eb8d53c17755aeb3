//! Static game catalog, populated at compile time and read-only for the life
//! of the process. Lookups return references into the static tables or fresh
//! owned copies; nothing here is ever mutated after boot.

pub mod banners;
pub mod equipment;
pub mod formations;
pub mod heroes;
pub mod skills;
pub mod stages;

pub use banners::{get_banner, BannerDef, BANNERS};
pub use equipment::{get_equipment_set, get_equipment_template, EquipmentTemplate};
pub use formations::{all_formations, get_formation};
pub use heroes::{get_hero_template, pool_by_rarity, HeroTemplate, HERO_TEMPLATES};
pub use skills::get_skill_spec;
pub use stages::{
    first_clear_rewards, get_chapter, get_chapter_by_number, get_stage, repeat_rewards, ChapterDef,
    StageDef, CHAPTERS,
};
