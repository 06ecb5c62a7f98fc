use crate::engine::store::{GrantStore, StoreError};
use crate::models::{GrantScope, PermissionGrant};
use crate::utils::now_utc;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::path::{Path, PathBuf};

/// Where a SQLite-backed store keeps its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteLocation {
    Memory,
    File(PathBuf),
}

impl SqliteLocation {
    /// Accepts `sqlite::memory:`, `:memory:`, `sqlite://<path>`, `sqlite:<path>`
    /// or a bare file path.
    pub fn parse(connection_string: &str) -> Result<Self, StoreError> {
        let trimmed = connection_string.trim();
        if trimmed == ":memory:" || trimmed == "sqlite::memory:" || trimmed == "sqlite://:memory:" {
            return Ok(Self::Memory);
        }

        let path = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix("sqlite:"))
            .unwrap_or(trimmed);

        if path.is_empty() || path.contains("://") {
            return Err(StoreError::InvalidConnectionString(connection_string.to_string()));
        }

        Ok(Self::File(PathBuf::from(path)))
    }
}

/// Grant store persisting rows to SQLite.
///
/// Uses sqlx for async access; the pool is safe to share across tasks.
/// The unique index on (identity, service, permission, created_by) is what
/// keeps concurrent `give` calls from writing the same grant twice.
#[derive(Debug, Clone)]
pub struct SqliteGrantStore {
    pool: SqlitePool,
}

impl SqliteGrantStore {
    /// Open (or create) the store and initialize the schema.
    pub async fn connect(connection_string: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = match SqliteLocation::parse(connection_string)? {
            // Every connection to :memory: is a separate database, so keep exactly one alive
            SqliteLocation::Memory => {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(SqliteConnectOptions::new().in_memory(true))
                    .await?
            }
            SqliteLocation::File(path) => {
                ensure_parent_dir(&path)?;
                SqlitePoolOptions::new()
                    .max_connections(max_connections.max(1))
                    .connect_with(
                        SqliteConnectOptions::new()
                            .filename(&path)
                            .create_if_missing(true)
                            .journal_mode(SqliteJournalMode::Wal),
                    )
                    .await?
            }
        };

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// In-memory store, mostly for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:", 1).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS permissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                identity INTEGER NOT NULL,
                service TEXT NOT NULL,
                permission TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (identity, service, permission, created_by)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_permissions_scope
             ON permissions(identity, service, created_by)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    fn row_to_grant(row: sqlx::sqlite::SqliteRow) -> Result<PermissionGrant, sqlx::Error> {
        Ok(PermissionGrant {
            identity: row.try_get(0)?,
            service: row.try_get(1)?,
            permission: row.try_get(2)?,
            created_by: row.try_get(3)?,
            created_at: row.try_get(4)?,
            updated_at: row.try_get(5)?,
        })
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }
    Ok(())
}

fn insert_error(error: sqlx::Error, permission: &str) -> StoreError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            StoreError::DuplicateGrant {
                permission: permission.to_string(),
            }
        }
        _ => StoreError::Database(error),
    }
}

#[async_trait]
impl GrantStore for SqliteGrantStore {
    async fn find_grants(&self, scope: &GrantScope) -> Result<Vec<PermissionGrant>, StoreError> {
        let rows = sqlx::query(
            "SELECT identity, service, permission, created_by, created_at, updated_at
             FROM permissions
             WHERE identity = ? AND service = ? AND created_by = ?
             ORDER BY id",
        )
        .bind(scope.identity)
        .bind(&scope.service)
        .bind(&scope.created_by)
        .fetch_all(&self.pool)
        .await?;

        let mut grants = Vec::with_capacity(rows.len());
        for row in rows {
            grants.push(Self::row_to_grant(row)?);
        }

        Ok(grants)
    }

    async fn insert_grants(&self, scope: &GrantScope, permissions: &[String]) -> Result<(), StoreError> {
        if permissions.is_empty() {
            return Ok(());
        }

        let now = now_utc();
        let mut tx = self.pool.begin().await?;

        for permission in permissions {
            // Dropping `tx` on error rolls back the rows inserted so far
            sqlx::query(
                "INSERT INTO permissions (identity, service, permission, created_by, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(scope.identity)
            .bind(&scope.service)
            .bind(permission)
            .bind(&scope.created_by)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error(e, permission))?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_grants(&self, scope: &GrantScope, permissions: &[String]) -> Result<u64, StoreError> {
        if permissions.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM permissions WHERE identity = ");
        builder.push_bind(scope.identity);
        builder.push(" AND service = ");
        builder.push_bind(scope.service.clone());
        builder.push(" AND created_by = ");
        builder.push_bind(scope.created_by.clone());
        builder.push(" AND permission IN (");
        let mut values = builder.separated(", ");
        for permission in permissions {
            values.push_bind(permission.clone());
        }
        values.push_unseparated(")");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
