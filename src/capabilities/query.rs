use crate::engine::{GrantStore, StoreError};
use crate::models::GrantScope;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Whether a single requested permission is held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheck {
    pub permission: String,
    pub has: bool,
}

/// Answer to `has`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasReport {
    /// True iff every requested permission is held
    pub has: bool,

    /// One entry per requested permission, in request order
    pub permissions: Vec<PermissionCheck>,
}

/// Answer to `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionList {
    pub permissions: Vec<String>,
    pub total: usize,
}

/// Check `requested` against the grants under `scope` with a single store read.
pub async fn has(
    store: &dyn GrantStore,
    scope: &GrantScope,
    requested: &[String],
) -> Result<HasReport, StoreError> {
    let existing = store.find_permissions(scope).await?;
    let existing: HashSet<&str> = existing.iter().map(String::as_str).collect();

    let permissions: Vec<PermissionCheck> = requested
        .iter()
        .map(|permission| PermissionCheck {
            permission: permission.clone(),
            has: existing.contains(permission.as_str()),
        })
        .collect();

    let has = permissions.iter().all(|check| check.has);

    Ok(HasReport { has, permissions })
}

/// Every permission granted under `scope`; empty when there are none.
pub async fn list(store: &dyn GrantStore, scope: &GrantScope) -> Result<PermissionList, StoreError> {
    let permissions = store.find_permissions(scope).await?;
    let total = permissions.len();
    Ok(PermissionList { permissions, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::InMemoryGrantStore;
    use async_trait::async_trait;
    use crate::models::PermissionGrant;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn perms(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// Counts reads so the single-query contract can be asserted.
    struct CountingStore {
        inner: InMemoryGrantStore,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl GrantStore for CountingStore {
        async fn find_grants(&self, scope: &GrantScope) -> Result<Vec<PermissionGrant>, StoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.find_grants(scope).await
        }

        async fn insert_grants(&self, scope: &GrantScope, permissions: &[String]) -> Result<(), StoreError> {
            self.inner.insert_grants(scope, permissions).await
        }

        async fn delete_grants(&self, scope: &GrantScope, permissions: &[String]) -> Result<u64, StoreError> {
            self.inner.delete_grants(scope, permissions).await
        }
    }

    #[tokio::test]
    async fn test_has_batch_uses_one_read() {
        let store = CountingStore {
            inner: InMemoryGrantStore::new(),
            reads: AtomicUsize::new(0),
        };
        let scope = GrantScope::new(1, "billing", "alice");
        store.insert_grants(&scope, &perms(&["a", "b"])).await.unwrap();

        let report = has(&store, &scope, &perms(&["a", "b", "c"])).await.unwrap();

        assert!(!report.has);
        assert_eq!(
            report.permissions,
            vec![
                PermissionCheck { permission: "a".to_string(), has: true },
                PermissionCheck { permission: "b".to_string(), has: true },
                PermissionCheck { permission: "c".to_string(), has: false },
            ]
        );
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_has_single_permission() {
        let store = InMemoryGrantStore::new();
        let scope = GrantScope::new(1, "billing", "alice");
        store.insert_grants(&scope, &perms(&["a"])).await.unwrap();

        let report = has(&store, &scope, &perms(&["a"])).await.unwrap();
        assert!(report.has);
        assert_eq!(report.permissions.len(), 1);

        let report = has(&store, &scope, &perms(&["b"])).await.unwrap();
        assert!(!report.has);
    }

    #[tokio::test]
    async fn test_has_empty_request_is_vacuously_true() {
        let store = InMemoryGrantStore::new();
        let report = has(&store, &GrantScope::new(1, "billing", "alice"), &[])
            .await
            .unwrap();

        assert!(report.has);
        assert!(report.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_has_is_scoped_by_creator() {
        let store = InMemoryGrantStore::new();
        store
            .insert_grants(&GrantScope::new(1, "billing", "alice"), &perms(&["a"]))
            .await
            .unwrap();

        let report = has(&store, &GrantScope::new(1, "billing", "bob"), &perms(&["a"]))
            .await
            .unwrap();
        assert!(!report.has);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let store = InMemoryGrantStore::new();
        let result = list(&store, &GrantScope::new(1, "billing", "alice")).await.unwrap();

        assert!(result.permissions.is_empty());
        assert_eq!(result.total, 0);
    }

    #[tokio::test]
    async fn test_list_returns_all_with_total() {
        let store = InMemoryGrantStore::new();
        let scope = GrantScope::new(1, "billing", "alice");
        store.insert_grants(&scope, &perms(&["a", "b", "c"])).await.unwrap();

        let result = list(&store, &scope).await.unwrap();
        assert_eq!(result.permissions, perms(&["a", "b", "c"]));
        assert_eq!(result.total, 3);
    }
}
