//! SQLite-backed document store
//!
//! One table per collection, each row holding the entity's JSON document.
//! A [`WriteBatch`] runs inside a single transaction, so a failing operation
//! rolls back everything before it.

use crate::batch::{WriteBatch, WriteOp};
use crate::collection::Collection;
use crate::error::{DatabaseError, DatabaseResult};
use crate::query::ListQuery;
use crate::store::DocumentStore;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;

/// Configuration for the SQLite store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the database file, created if missing
    pub db_path: String,
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            db_path: "caredesk.db".to_string(),
            max_connections: 5,
            enable_wal: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(config: &SqliteConfig) -> DatabaseResult<Self> {
        let mut options = SqliteConnectOptions::new()
            .filename(&config.db_path)
            .create_if_missing(true)
            .foreign_keys(true);
        if config.enable_wal {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let store = Self { pool };
        store.initialize_schema().await?;
        info!(path = %config.db_path, wal = config.enable_wal, "SQLite store ready");
        Ok(store)
    }

    async fn initialize_schema(&self) -> DatabaseResult<()> {
        for collection in Collection::ALL {
            let table = collection.table_name();
            sqlx::query(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id TEXT PRIMARY KEY,
                    business_id TEXT,
                    data TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
                "#
            ))
            .execute(&self.pool)
            .await?;

            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_business_id ON {table}(business_id)"
            ))
            .execute(&self.pool)
            .await?;
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_created ON {table}(created_at)"
            ))
            .execute(&self.pool)
            .await?;
        }
        debug!("SQLite schema initialized");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &ListQuery) {
        for (field, value) in query.filters() {
            let path = format!("$.{field}");
            // json_extract turns JSON booleans into 0/1; compare them as text instead
            builder
                .push(" AND (CASE json_type(data, ")
                .push_bind(path.clone())
                .push(") WHEN 'true' THEN 'true' WHEN 'false' THEN 'false' ELSE CAST(json_extract(data, ")
                .push_bind(path)
                .push(") AS TEXT) END) = ")
                .push_bind(value.clone());
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_row(row: &sqlx::sqlite::SqliteRow) -> DatabaseResult<Value> {
    let data: String = row.try_get("data")?;
    Ok(serde_json::from_str(&data)?)
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, collection: Collection, id: Uuid) -> DatabaseResult<Option<Value>> {
        let row = sqlx::query(&format!(
            "SELECT data FROM {} WHERE id = ?",
            collection.table_name()
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(decode_row).transpose()
    }

    async fn list(&self, collection: Collection, query: &ListQuery) -> DatabaseResult<Vec<Value>> {
        query.validate()?;
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT data FROM {} WHERE 1 = 1",
            collection.table_name()
        ));
        Self::push_filters(&mut builder, query);
        builder.push(" ORDER BY created_at, rowid");

        match query.limit() {
            Some(limit) => {
                builder.push(" LIMIT ").push_bind(i64::from(limit));
            }
            None => {
                builder.push(" LIMIT -1");
            }
        }
        let offset = i64::try_from(query.offset()).unwrap_or(i64::MAX);
        builder.push(" OFFSET ").push_bind(offset);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn count(&self, collection: Collection, query: &ListQuery) -> DatabaseResult<u64> {
        query.validate()?;
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT COUNT(*) AS total FROM {} WHERE 1 = 1",
            collection.table_name()
        ));
        Self::push_filters(&mut builder, query);

        let row = builder.build().fetch_one(&self.pool).await?;
        let total: i64 = row.try_get("total")?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> DatabaseResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let applied = batch.len();
        let now = timestamp();
        let mut tx = self.pool.begin().await?;

        for op in batch.into_ops() {
            match op {
                WriteOp::Insert {
                    collection,
                    id,
                    business_id,
                    document,
                } => {
                    sqlx::query(&format!(
                        "INSERT INTO {} (id, business_id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
                        collection.table_name()
                    ))
                    .bind(id.to_string())
                    .bind(business_id)
                    .bind(serde_json::to_string(&document)?)
                    .bind(&now)
                    .bind(&now)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        let duplicate = matches!(
                            &e,
                            sqlx::Error::Database(db) if db.is_unique_violation()
                        );
                        if duplicate {
                            DatabaseError::Conflict { collection, id }
                        } else {
                            DatabaseError::SqlxError(e)
                        }
                    })?;
                }
                WriteOp::Update {
                    collection,
                    id,
                    business_id,
                    document,
                } => {
                    let result = sqlx::query(&format!(
                        "UPDATE {} SET business_id = ?, data = ?, updated_at = ? WHERE id = ?",
                        collection.table_name()
                    ))
                    .bind(business_id)
                    .bind(serde_json::to_string(&document)?)
                    .bind(&now)
                    .bind(id.to_string())
                    .execute(&mut *tx)
                    .await?;
                    if result.rows_affected() == 0 {
                        return Err(DatabaseError::NotFound { collection, id });
                    }
                }
                WriteOp::Delete { collection, id } => {
                    let result = sqlx::query(&format!(
                        "DELETE FROM {} WHERE id = ?",
                        collection.table_name()
                    ))
                    .bind(id.to_string())
                    .execute(&mut *tx)
                    .await?;
                    if result.rows_affected() == 0 {
                        return Err(DatabaseError::NotFound { collection, id });
                    }
                }
            }
        }

        tx.commit().await?;
        debug!(operations = applied, "Committed batch to SQLite");
        Ok(())
    }

    async fn health_check(&self) -> DatabaseResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
