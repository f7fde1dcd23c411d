//! Postgres-backed store. The production backend; schema in `migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::Identity;
use crate::models::folder::{Folder, FolderPatch, NewFolder, DEFAULT_FOLDER_COLOR};
use crate::models::tip::{EstimatedTime, NewTip, Tip, TipPatch, UrgencyLevel};
use crate::storage::{FolderStore, StoreError, TipStore};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape as stored; enums live as TEXT columns and are re-parsed on the
/// way out (unknown labels degrade to the defaults rather than failing the
/// read).
#[derive(Debug, FromRow)]
struct TipRow {
    id: Uuid,
    content: String,
    url: Option<String>,
    title: Option<String>,
    relevance_date: Option<NaiveDate>,
    relevance_event: Option<String>,
    folder: String,
    priority: String,
    summary: String,
    tags: Vec<String>,
    urgency_level: String,
    action_required: bool,
    estimated_time: String,
    is_processed: bool,
    ai_processed: bool,
    ai_error: Option<String>,
    user_context: Option<String>,
    needs_more_info: bool,
    created_at: DateTime<Utc>,
}

impl From<TipRow> for Tip {
    fn from(row: TipRow) -> Self {
        Tip {
            id: row.id,
            content: row.content,
            url: row.url,
            title: row.title,
            relevance_date: row.relevance_date,
            relevance_event: row.relevance_event,
            folder: row.folder,
            priority: row.priority,
            summary: row.summary,
            tags: row.tags,
            urgency_level: UrgencyLevel::parse(&row.urgency_level).unwrap_or_default(),
            action_required: row.action_required,
            estimated_time: EstimatedTime::parse(&row.estimated_time).unwrap_or_default(),
            is_processed: row.is_processed,
            ai_processed: row.ai_processed,
            ai_error: row.ai_error,
            user_context: row.user_context,
            needs_more_info: row.needs_more_info,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct FolderRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FolderRow> for Folder {
    fn from(row: FolderRow) -> Self {
        Folder {
            id: row.id,
            name: row.name,
            description: row.description,
            color: row.color,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const TIP_COLUMNS: &str = "id, content, url, title, relevance_date, relevance_event, folder, \
     priority, summary, tags, urgency_level, action_required, estimated_time, \
     is_processed, ai_processed, ai_error, user_context, needs_more_info, created_at";

#[async_trait]
impl TipStore for PgStore {
    async fn list(&self, identity: &Identity) -> Result<Vec<Tip>, StoreError> {
        let rows: Vec<TipRow> = sqlx::query_as(&format!(
            "SELECT {TIP_COLUMNS} FROM tips WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(identity.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Tip::from).collect())
    }

    async fn create(&self, identity: &Identity, tip: NewTip) -> Result<Tip, StoreError> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO tips
                (id, user_id, content, url, title, relevance_date, relevance_event,
                 folder, priority, summary, tags, urgency_level, action_required,
                 estimated_time, is_processed, ai_processed, ai_error, user_context,
                 needs_more_info, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(id)
        .bind(identity.as_str())
        .bind(&tip.content)
        .bind(&tip.url)
        .bind(&tip.title)
        .bind(tip.relevance_date)
        .bind(&tip.relevance_event)
        .bind(&tip.folder)
        .bind(&tip.priority)
        .bind(&tip.summary)
        .bind(&tip.tags)
        .bind(tip.urgency_level.as_str())
        .bind(tip.action_required)
        .bind(tip.estimated_time.as_str())
        .bind(tip.is_processed)
        .bind(tip.ai_processed)
        .bind(&tip.ai_error)
        .bind(&tip.user_context)
        .bind(tip.needs_more_info)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(Tip {
            id,
            created_at,
            content: tip.content,
            url: tip.url,
            title: tip.title,
            relevance_date: tip.relevance_date,
            relevance_event: tip.relevance_event,
            folder: tip.folder,
            priority: tip.priority,
            summary: tip.summary,
            tags: tip.tags,
            urgency_level: tip.urgency_level,
            action_required: tip.action_required,
            estimated_time: tip.estimated_time,
            is_processed: tip.is_processed,
            ai_processed: tip.ai_processed,
            ai_error: tip.ai_error,
            user_context: tip.user_context,
            needs_more_info: tip.needs_more_info,
        })
    }

    async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        patch: TipPatch,
    ) -> Result<Option<Tip>, StoreError> {
        // Read-modify-write keeps patch semantics in one place (TipPatch::apply)
        let existing: Option<TipRow> = sqlx::query_as(&format!(
            "SELECT {TIP_COLUMNS} FROM tips WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = existing else {
            return Ok(None);
        };
        let mut tip = Tip::from(row);
        patch.apply(&mut tip);

        sqlx::query(
            r#"
            UPDATE tips SET
                content = $3, url = $4, title = $5, relevance_date = $6,
                relevance_event = $7, folder = $8, priority = $9, summary = $10,
                tags = $11, urgency_level = $12, action_required = $13,
                estimated_time = $14, is_processed = $15, user_context = $16,
                needs_more_info = $17
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(identity.as_str())
        .bind(&tip.content)
        .bind(&tip.url)
        .bind(&tip.title)
        .bind(tip.relevance_date)
        .bind(&tip.relevance_event)
        .bind(&tip.folder)
        .bind(&tip.priority)
        .bind(&tip.summary)
        .bind(&tip.tags)
        .bind(tip.urgency_level.as_str())
        .bind(tip.action_required)
        .bind(tip.estimated_time.as_str())
        .bind(tip.is_processed)
        .bind(&tip.user_context)
        .bind(tip.needs_more_info)
        .execute(&self.pool)
        .await?;

        Ok(Some(tip))
    }

    async fn delete(&self, identity: &Identity, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tips WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(identity.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl FolderStore for PgStore {
    async fn list(&self, identity: &Identity) -> Result<Vec<Folder>, StoreError> {
        let rows: Vec<FolderRow> = sqlx::query_as(
            "SELECT id, name, description, color, created_at, updated_at \
             FROM folders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(identity.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Folder::from).collect())
    }

    async fn create(&self, identity: &Identity, folder: NewFolder) -> Result<Folder, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let color = folder
            .color
            .unwrap_or_else(|| DEFAULT_FOLDER_COLOR.to_string());
        let name = folder.name.trim().to_string();

        sqlx::query(
            "INSERT INTO folders (id, user_id, name, description, color, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(identity.as_str())
        .bind(&name)
        .bind(&folder.description)
        .bind(&color)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Folder {
            id,
            name,
            description: folder.description,
            color,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        patch: FolderPatch,
    ) -> Result<Option<Folder>, StoreError> {
        let existing: Option<FolderRow> = sqlx::query_as(
            "SELECT id, name, description, color, created_at, updated_at \
             FROM folders WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = existing else {
            return Ok(None);
        };
        let mut folder = Folder::from(row);
        patch.apply(&mut folder);
        folder.updated_at = Utc::now();

        sqlx::query(
            "UPDATE folders SET name = $3, description = $4, color = $5, updated_at = $6 \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(identity.as_str())
        .bind(&folder.name)
        .bind(&folder.description)
        .bind(&folder.color)
        .bind(folder.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(Some(folder))
    }

    async fn delete(&self, identity: &Identity, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(identity.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
