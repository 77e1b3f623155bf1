use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

// ============================================================================
// Database
// ============================================================================

/// Per-user SQLite store. Everything durable lives in named slots: one JSON
/// document per key, replaced wholesale on every write. This mirrors the
/// single-writer, atomic-per-key storage primitive the app is designed
/// around.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a database connection and run migrations.
    pub async fn open(path: &str) -> Result<Self, sqlx::Error> {
        let url = format!("sqlite:{}?mode=rwc", path);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ========================================================================
    // Slot Operations
    // ========================================================================

    /// Read the raw value of a slot, or `None` if the slot was never written.
    pub async fn get_slot(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM slots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Replace a slot's value wholesale (UPSERT).
    pub async fn set_slot(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO slots (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a slot. Removing a slot that does not exist is a no-op.
    pub async fn delete_slot(&self, key: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM slots WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
