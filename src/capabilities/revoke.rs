use crate::engine::{GrantStore, StoreError};
use crate::models::GrantScope;

/// Revoke `permissions` under `scope`.
///
/// Always reports the requested list, whether or not each grant existed.
pub async fn lose(
    store: &dyn GrantStore,
    scope: &GrantScope,
    permissions: &[String],
) -> Result<Vec<String>, StoreError> {
    let removed = store.delete_grants(scope, permissions).await?;

    log::info!(
        "Revoked {} of {} requested permission(s) from {} on {} by {}",
        removed,
        permissions.len(),
        scope.identity,
        scope.service,
        scope.created_by
    );

    Ok(permissions.to_vec())
}
