use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Open the database, apply pragmas, run the schema, and seed the catalog
/// mirror tables.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    // WAL for concurrent read/write access
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    // Foreign keys are off by default in SQLite
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // Run schema: split by semicolons since SQLx cannot execute multiple statements at once
    let schema = include_str!("schema.sql");
    for statement in schema.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(&pool).await?;
        }
    }

    super::seed::seed_catalog(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
pub async fn test_pool() -> (SqlitePool, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("test.db");
    let url = format!("sqlite:{}?mode=rwc", path.display());
    let pool = init_pool(&url).await.unwrap();
    (pool, dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_applies_and_catalog_is_seeded() {
        let (pool, _dir) = test_pool().await;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hero_templates")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count as usize, crate::catalog::HERO_TEMPLATES.len());

        let (stages,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stages")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(stages > 0);
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let url = format!("sqlite:{}?mode=rwc", path.display());
        init_pool(&url).await.unwrap();
        // A second init against the same file must not fail or duplicate
        let pool = init_pool(&url).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hero_templates")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count as usize, crate::catalog::HERO_TEMPLATES.len());
    }
}
