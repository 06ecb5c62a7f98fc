use crate::models::{GrantScope, PermissionGrant};
use async_trait::async_trait;
use thiserror::Error;

/// Persistence failures surfaced by a [`GrantStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The (identity, service, permission, created_by) tuple already exists.
    /// Raised when a concurrent writer inserted the same grant first.
    #[error("grant already exists: {permission}")]
    DuplicateGrant { permission: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid connection string '{0}'")]
    InvalidConnectionString(String),
}

/// Persistence contract for permission grants.
///
/// Every operation is scoped by a [`GrantScope`]. Rows belonging to any other
/// scope are never read or touched.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// All grants under `scope`, in insertion order.
    async fn find_grants(&self, scope: &GrantScope) -> Result<Vec<PermissionGrant>, StoreError>;

    /// Append one row per permission, all-or-nothing.
    ///
    /// Fails with [`StoreError::DuplicateGrant`] if any tuple already exists,
    /// in which case nothing is written.
    async fn insert_grants(&self, scope: &GrantScope, permissions: &[String]) -> Result<(), StoreError>;

    /// Remove the named permissions under `scope` and return how many rows went away.
    /// Unknown permissions are ignored.
    async fn delete_grants(&self, scope: &GrantScope, permissions: &[String]) -> Result<u64, StoreError>;

    /// Permission strings held under `scope`.
    async fn find_permissions(&self, scope: &GrantScope) -> Result<Vec<String>, StoreError> {
        let grants = self.find_grants(scope).await?;
        Ok(grants.into_iter().map(|grant| grant.permission).collect())
    }
}
