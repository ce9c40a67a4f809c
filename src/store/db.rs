//! SQLite-backed conversation log
//!
//! Handles all database interactions for the conversation log. Writes are
//! plain INSERTs - true append-only, no read-modify-rewrite.

use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::chat::LogEntry;
use crate::error::AppError;
use crate::store::ConversationStore;

/// Database connection pool for conversation log operations
pub struct ChatLogDb {
    pool: SqlitePool,
}

impl ChatLogDb {
    /// Initialize database connection pool
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Returns
    /// * `Ok(ChatLogDb)` if successful
    /// * `Err(AppError)` if connection failed
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Ensure parent directory exists
        if let Some(parent) = PathBuf::from(db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("Failed to create db directory: {}", e)))?;
        }

        // SQLite connection string format: sqlite://path/to/db.db
        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Storage(format!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to connect to database: {}", e)))?;

        info!("Connected to SQLite conversation log at: {}", db_path);

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), AppError> {
        let migration_sql = include_str!("../../migrations/001_create_chat_log.sql");

        // Strip comment lines, then execute statement by statement
        let mut cleaned_sql = String::new();
        for line in migration_sql.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("--") {
                continue;
            }
            let without_comments = if let Some(comment_pos) = trimmed.find("--") {
                &trimmed[..comment_pos]
            } else {
                trimmed
            };
            cleaned_sql.push_str(without_comments.trim());
            cleaned_sql.push(' ');
        }

        let statements: Vec<&str> = cleaned_sql
            .split(';')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Storage(format!("Migration failed: {}", e)))?;
        }

        debug!("Conversation log migrations completed");
        Ok(())
    }

    /// Get the database pool (for advanced operations if needed)
    #[allow(dead_code)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ConversationStore for ChatLogDb {
    async fn append(&self, entry: &LogEntry) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO chat_log (id, conversation_id, role, content, timestamp) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.conversation_id)
        .bind(&entry.role)
        .bind(&entry.content)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to append log entry: {}", e)))?;

        debug!(
            "Appended {} entry {} to conversation {}",
            entry.role, entry.id, entry.conversation_id
        );
        Ok(())
    }

    async fn query(&self, conversation_id: &str) -> Result<Vec<LogEntry>, AppError> {
        // Bursts of assistant partials land in the same millisecond; rowid
        // reflects insertion order, so equal timestamps stay append-ordered
        let entries = sqlx::query_as::<_, LogEntry>(
            "SELECT id, conversation_id, role, content, timestamp FROM chat_log WHERE conversation_id = ? ORDER BY timestamp DESC, rowid DESC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to fetch log entries: {}", e)))?;

        Ok(entries)
    }
}
