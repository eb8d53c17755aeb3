//! Persistence layer: SQLite via sqlx, one module per aggregate.

pub mod equipment;
pub mod gacha;
pub mod heroes;
pub mod players;
pub mod pool;
pub mod seed;
pub mod story;
pub mod teams;
