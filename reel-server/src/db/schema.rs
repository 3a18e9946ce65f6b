//! Table creation (idempotent, safe to run on every connect)

use sqlx::SqlitePool;
use tracing::debug;

/// Create tables and indexes if needed
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    create_videos_table(pool).await?;
    Ok(())
}

async fn create_videos_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Timestamps are Unix milliseconds so ordering is numeric
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS videos (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            video_url TEXT NOT NULL,
            thumbnail_url TEXT NOT NULL,
            controls INTEGER NOT NULL DEFAULT 1,
            transformation TEXT,
            likes INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_videos_created_at ON videos(created_at)")
        .execute(pool)
        .await?;

    debug!("videos table ready");
    Ok(())
}
