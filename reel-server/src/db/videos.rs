//! Video entity store
//!
//! CRUD over persisted video records. Every operation acquires the shared
//! store connection first, then checks the identifier format, so a
//! malformed id is always `InvalidId` and never `NotFound`.

use crate::db::connection::{ConnectionError, StoreConnection};
use chrono::{DateTime, Utc};
use reel_common::api::{ListQuery, SortOrder};
use reel_common::{InvalidVideoId, NewVideo, Transformation, ValidationError, VideoId, VideoPatch, VideoRecord};
use reel_common::models::VideoFields;
use sqlx::{Sqlite, SqlitePool};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Largest page a single list call may return
pub const MAX_PAGE_SIZE: i64 = 100;

macro_rules! columns {
    () => {
        "id, title, description, video_url, thumbnail_url, controls, \
         transformation, likes, created_at, updated_at"
    };
}

// Ids carry a per-process counter, so they break ties within one millisecond
const LIST_DESC: &str = concat!(
    "SELECT ", columns!(), " FROM videos ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
);
const LIST_ASC: &str = concat!(
    "SELECT ", columns!(), " FROM videos ORDER BY created_at ASC, id ASC LIMIT ? OFFSET ?"
);
const SELECT_BY_ID: &str = concat!("SELECT ", columns!(), " FROM videos WHERE id = ?");
const INSERT: &str = concat!(
    "INSERT INTO videos (", columns!(), ") VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING ", columns!()
);
const UPDATE: &str = concat!(
    "UPDATE videos SET title = ?, description = ?, video_url = ?, thumbnail_url = ?, \
     controls = ?, transformation = ?, likes = ?, updated_at = MAX(?, updated_at + 1) \
     WHERE id = ? RETURNING ", columns!()
);
const LIKE: &str = concat!(
    "UPDATE videos SET likes = likes + 1, updated_at = MAX(?, updated_at + 1) \
     WHERE id = ? RETURNING ", columns!()
);
const UNLIKE: &str = concat!(
    "UPDATE videos SET likes = MAX(likes - 1, 0), updated_at = MAX(?, updated_at + 1) \
     WHERE id = ? RETURNING ", columns!()
);

/// Store operation failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Identifier does not have the store's format
    #[error("invalid video id: {0:?}")]
    InvalidId(String),

    /// Well-formed identifier with no matching record
    #[error("video not found: {0}")]
    NotFound(VideoId),

    /// Payload failed required-field rules
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Connection or infrastructure failure; callers may retry
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other database failure
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<InvalidVideoId> for StoreError {
    fn from(err: InvalidVideoId) -> Self {
        StoreError::InvalidId(err.0)
    }
}

impl From<ConnectionError> for StoreError {
    fn from(err: ConnectionError) -> Self {
        StoreError::Unavailable(err.0)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let unavailable = match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => true,
            // SQLITE_BUSY / SQLITE_LOCKED
            sqlx::Error::Database(db) => matches!(db.code().as_deref(), Some("5") | Some("6")),
            _ => false,
        };

        if unavailable {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Database(err)
        }
    }
}

#[derive(sqlx::FromRow)]
struct VideoRow {
    id: String,
    title: String,
    description: String,
    video_url: String,
    thumbnail_url: String,
    controls: bool,
    transformation: Option<String>,
    likes: i64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<VideoRow> for VideoRecord {
    type Error = StoreError;

    fn try_from(row: VideoRow) -> Result<Self> {
        let id = VideoId::parse(&row.id).map_err(decode_error)?;
        let transformation = row
            .transformation
            .as_deref()
            .map(serde_json::from_str::<Transformation>)
            .transpose()
            .map_err(decode_error)?;

        Ok(VideoRecord {
            id,
            title: row.title,
            description: row.description,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            controls: row.controls,
            transformation,
            likes: row.likes,
            created_at: millis_to_datetime(row.created_at)?,
            updated_at: millis_to_datetime(row.updated_at)?,
        })
    }
}

fn decode_error<E>(err: E) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StoreError::Database(sqlx::Error::Decode(Box::new(err)))
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        StoreError::Database(sqlx::Error::Decode(
            format!("timestamp out of range: {}", ms).into(),
        ))
    })
}

fn encode_transformation(transformation: &Option<Transformation>) -> Result<Option<String>> {
    transformation
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| StoreError::Database(sqlx::Error::Encode(Box::new(e))))
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// CRUD primitives over the `videos` table
#[derive(Clone)]
pub struct VideoStore {
    connections: Arc<StoreConnection>,
}

impl VideoStore {
    pub fn new(connections: Arc<StoreConnection>) -> Self {
        Self { connections }
    }

    async fn pool(&self) -> Result<SqlitePool> {
        Ok(self.connections.acquire().await?)
    }

    /// Whole catalog, newest first
    pub async fn find_all(&self) -> Result<Vec<VideoRecord>> {
        self.list(&ListQuery::default()).await
    }

    /// Catalog page ordered by creation time
    ///
    /// `limit` is clamped to 1..=[`MAX_PAGE_SIZE`]; without one every record
    /// from `offset` on is returned.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<VideoRecord>> {
        let pool = self.pool().await?;

        let order = query.order.unwrap_or_default();
        let limit = query.limit.map(|l| l.clamp(1, MAX_PAGE_SIZE)).unwrap_or(-1);
        let offset = query.offset.unwrap_or(0).max(0);

        let sql = match order {
            SortOrder::Asc => LIST_ASC,
            SortOrder::Desc => LIST_DESC,
        };

        let rows = sqlx::query_as::<_, VideoRow>(sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&pool)
            .await?;

        debug!(count = rows.len(), "Listed videos");
        rows.into_iter().map(VideoRecord::try_from).collect()
    }

    /// Single record by id
    pub async fn find_by_id(&self, id: &str) -> Result<VideoRecord> {
        let pool = self.pool().await?;
        let id = VideoId::parse(id)?;

        fetch_one_video(&pool, &id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    /// Validate and persist a new record
    pub async fn create(&self, new_video: NewVideo) -> Result<VideoRecord> {
        let pool = self.pool().await?;
        let fields = new_video.into_fields()?;
        let id = VideoId::generate();
        let now = now_millis();

        let row = sqlx::query_as::<_, VideoRow>(INSERT)
            .bind(id.to_string())
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(&fields.video_url)
            .bind(&fields.thumbnail_url)
            .bind(fields.controls)
            .bind(encode_transformation(&fields.transformation)?)
            .bind(fields.likes)
            .bind(now)
            .bind(now)
            .fetch_one(&pool)
            .await?;

        info!(id = %id, title = %fields.title, "Created video");
        row.try_into()
    }

    /// Apply a partial update and re-validate the merged record
    pub async fn update(&self, id: &str, patch: VideoPatch) -> Result<VideoRecord> {
        let pool = self.pool().await?;
        let id = VideoId::parse(id)?;

        // Write lock up front; a deferred read-then-write upgrade gets
        // SQLITE_BUSY without waiting on busy_timeout.
        let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

        let current = fetch_one_video(&mut *tx, &id)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        let fields: VideoFields = patch.apply(&current)?;

        let row = sqlx::query_as::<_, VideoRow>(UPDATE)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(&fields.video_url)
            .bind(&fields.thumbnail_url)
            .bind(fields.controls)
            .bind(encode_transformation(&fields.transformation)?)
            .bind(fields.likes)
            .bind(now_millis())
            .bind(id.to_string())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %id, "Updated video");
        row.try_into()
    }

    /// Remove a record
    pub async fn delete(&self, id: &str) -> Result<()> {
        let pool = self.pool().await?;
        let id = VideoId::parse(id)?;

        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id.to_string())
            .execute(&pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        info!(id = %id, "Deleted video");
        Ok(())
    }

    /// Increment the like counter
    pub async fn like(&self, id: &str) -> Result<VideoRecord> {
        self.adjust_likes(id, LIKE).await
    }

    /// Decrement the like counter, never below zero
    pub async fn unlike(&self, id: &str) -> Result<VideoRecord> {
        self.adjust_likes(id, UNLIKE).await
    }

    async fn adjust_likes(&self, id: &str, sql: &'static str) -> Result<VideoRecord> {
        let pool = self.pool().await?;
        let id = VideoId::parse(id)?;

        let row = sqlx::query_as::<_, VideoRow>(sql)
            .bind(now_millis())
            .bind(id.to_string())
            .fetch_optional(&pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        debug!(id = %id, likes = row.likes, "Adjusted likes");
        row.try_into()
    }
}

async fn fetch_one_video<'e, E>(executor: E, id: &VideoId) -> Result<Option<VideoRecord>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, VideoRow>(SELECT_BY_ID)
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;

    row.map(VideoRecord::try_from).transpose()
}
