use crate::engine::store::{GrantStore, StoreError};
use crate::models::{GrantScope, PermissionGrant};
use async_trait::async_trait;
use dashmap::DashMap;

/// Grant store held entirely in process memory.
///
/// Rows are bucketed per scope; the DashMap shard lock on a bucket makes the
/// duplicate check and the append in `insert_grants` a single step.
#[derive(Debug, Default)]
pub struct InMemoryGrantStore {
    grants: DashMap<GrantScope, Vec<PermissionGrant>>,
}

impl InMemoryGrantStore {
    pub fn new() -> Self {
        Self {
            grants: DashMap::new(),
        }
    }

    /// Total rows across all scopes.
    pub fn len(&self) -> usize {
        self.grants.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl GrantStore for InMemoryGrantStore {
    async fn find_grants(&self, scope: &GrantScope) -> Result<Vec<PermissionGrant>, StoreError> {
        Ok(self
            .grants
            .get(scope)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn insert_grants(&self, scope: &GrantScope, permissions: &[String]) -> Result<(), StoreError> {
        if permissions.is_empty() {
            return Ok(());
        }

        for (index, permission) in permissions.iter().enumerate() {
            if permissions[..index].contains(permission) {
                return Err(StoreError::DuplicateGrant {
                    permission: permission.clone(),
                });
            }
        }

        // A bucket only exists while it holds rows, so a clash below never
        // leaves an empty one behind
        let mut bucket = self.grants.entry(scope.clone()).or_default();

        if let Some(permission) = permissions
            .iter()
            .find(|permission| bucket.iter().any(|grant| &grant.permission == *permission))
        {
            return Err(StoreError::DuplicateGrant {
                permission: permission.clone(),
            });
        }

        bucket.extend(
            permissions
                .iter()
                .map(|permission| PermissionGrant::new(scope, permission.clone())),
        );
        Ok(())
    }

    async fn delete_grants(&self, scope: &GrantScope, permissions: &[String]) -> Result<u64, StoreError> {
        let removed = match self.grants.get_mut(scope) {
            Some(mut bucket) => {
                let before = bucket.len();
                bucket.retain(|grant| !permissions.contains(&grant.permission));
                (before - bucket.len()) as u64
            }
            None => 0,
        };

        // Clean up empty buckets
        self.grants.remove_if(scope, |_, bucket| bucket.is_empty());

        Ok(removed)
    }
}
