use serde::{Deserialize, Serialize};

/// A persisted permission grant.
///
/// Each row states that `identity` was given `permission` by `created_by`
/// on behalf of `service`. Rows are created by `give` and removed by `lose`;
/// they are never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    /// The principal the permission applies to
    pub identity: i64,

    /// The owning service namespace
    pub service: String,

    /// The fully expanded permission token (e.g. "@admin:42:api.v1.admin")
    pub permission: String,

    /// The issuer, trimmed and lower-cased
    pub created_by: String,

    /// RFC 3339 UTC
    pub created_at: String,

    /// RFC 3339 UTC
    pub updated_at: String,
}

impl PermissionGrant {
    /// Create a new grant row under `scope`, stamped with the current time.
    pub fn new(scope: &GrantScope, permission: String) -> Self {
        let now = crate::utils::now_utc();
        Self {
            identity: scope.identity,
            service: scope.service.clone(),
            permission,
            created_by: scope.created_by.clone(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// The (identity, service, creator) key every store operation is scoped by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantScope {
    pub identity: i64,
    pub service: String,
    pub created_by: String,
}

impl GrantScope {
    /// Build a scope, normalizing the creator.
    pub fn new(identity: i64, service: impl Into<String>, creator: &str) -> Self {
        Self {
            identity,
            service: service.into(),
            created_by: normalize_creator(creator),
        }
    }
}

/// Creators are compared trimmed and lower-cased.
pub fn normalize_creator(creator: &str) -> String {
    creator.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_normalizes_creator() {
        let scope = GrantScope::new(7, "billing", "  Alice@Example.COM ");
        assert_eq!(scope.created_by, "alice@example.com");
        assert_eq!(scope.service, "billing");
    }

    #[test]
    fn test_new_grant_copies_scope() {
        let scope = GrantScope::new(1, "svc", "Alice");
        let grant = PermissionGrant::new(&scope, "read".to_string());

        assert_eq!(grant.identity, 1);
        assert_eq!(grant.service, "svc");
        assert_eq!(grant.created_by, "alice");
        assert_eq!(grant.permission, "read");
        assert_eq!(grant.created_at, grant.updated_at);
    }
}
