//! SQLite-backed task store.
//!
//! One table, four operations. The store owns identity assignment (UUID v4)
//! and the `created_at` / `updated_at` timestamps — client-supplied values for
//! either are never merged.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

/// Store-level failure taxonomy. The REST layer maps each variant onto an
/// HTTP status: EmptyTitle → 400, NotFound → 404, Db → 500.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task title must not be empty")]
    EmptyTitle,
    #[error("task not found")]
    NotFound,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    /// 24-hour "HH:MM" or empty.
    pub time: String,
    /// Calendar date string or empty.
    pub date: String,
    /// Display category (Work/Study/Personal/…) or empty.
    pub category: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Create payload. Everything except `title` is optional with empty defaults,
/// so the handler can deserialize the request body into this directly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewTask {
    pub title: String,
    pub time: String,
    pub date: String,
    pub category: String,
    pub completed: bool,
}

/// Partial update payload. Only these five fields are mutable; anything else
/// in the request body (ids, timestamps) is dropped at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub time: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub completed: Option<bool>,
}

// ─── Storage ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Open (or create) the database at `db_path` and run the schema migration.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn open(db_path: &Path, slow_query_ms: u64) -> anyhow::Result<Self> {
        if let Some(dir) = db_path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Idempotent schema creation.
    async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id         TEXT PRIMARY KEY,
                title      TEXT NOT NULL,
                time       TEXT NOT NULL DEFAULT '',
                date       TEXT NOT NULL DEFAULT '',
                category   TEXT NOT NULL DEFAULT '',
                completed  INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_tasks_created ON tasks(created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    // ─── Tasks ────────────────────────────────────────────────────────────────

    pub async fn create_task(&self, req: NewTask) -> Result<TaskRow, StoreError> {
        if req.title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO tasks (id, title, time, date, category, completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&req.title)
        .bind(&req.time)
        .bind(&req.date)
        .bind(&req.category)
        .bind(req.completed)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_task(&id).await?.ok_or(StoreError::NotFound)
    }

    pub async fn get_task(&self, id: &str) -> Result<Option<TaskRow>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// All tasks, newest first. An empty store yields an empty Vec.
    pub async fn list_tasks(&self) -> Result<Vec<TaskRow>, StoreError> {
        Ok(
            sqlx::query_as("SELECT * FROM tasks ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Merge `patch` into the task identified by `id`. Unspecified fields keep
    /// their prior values; `updated_at` is refreshed. Unknown ids fail with
    /// `NotFound`, and a supplied title may not be blank — the create-time
    /// invariant holds for the task's whole lifetime.
    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<TaskRow, StoreError> {
        let existing = self.get_task(id).await?.ok_or(StoreError::NotFound)?;

        if let Some(ref title) = patch.title {
            if title.trim().is_empty() {
                return Err(StoreError::EmptyTitle);
            }
        }

        let title = patch.title.unwrap_or(existing.title);
        let time = patch.time.unwrap_or(existing.time);
        let date = patch.date.unwrap_or(existing.date);
        let category = patch.category.unwrap_or(existing.category);
        let completed = patch.completed.unwrap_or(existing.completed);
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE tasks SET title = ?, time = ?, date = ?, category = ?, completed = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&title)
        .bind(&time)
        .bind(&date)
        .bind(&category)
        .bind(completed)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_task(id).await?.ok_or(StoreError::NotFound)
    }

    /// Remove the task if present. Returns whether a row was deleted; an
    /// absent id is not an error.
    pub async fn delete_task(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
