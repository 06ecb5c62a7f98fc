use crate::capabilities::template::{self, TemplateError};
use crate::engine::{GrantStore, StoreError};
use crate::models::{GrantScope, TemplateData};
use std::collections::HashSet;
use thiserror::Error;

/// Result of a successful `give`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GiveOutcome {
    /// Only the permissions this call actually inserted.
    Granted(Vec<String>),

    /// Nothing new to grant; carries the expanded request.
    AlreadyGranted(Vec<String>),
}

#[derive(Debug, Error)]
pub enum GiveError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Requested permissions not yet present, de-duplicated, in request order.
pub fn missing_permissions(requested: &[String], existing: &[String]) -> Vec<String> {
    let existing: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    requested
        .iter()
        .filter(|permission| !existing.contains(permission.as_str()))
        .filter(|permission| seen.insert(permission.as_str()))
        .cloned()
        .collect()
}

/// Grant `requested` under `scope`, skipping anything already held.
///
/// Placeholders are expanded from `data` first. The missing permissions are
/// inserted as one batch. A `DuplicateGrant` means another writer got there
/// first: the existing set is read again and the remainder is inserted one
/// permission at a time, where a per-permission `DuplicateGrant` counts as
/// already granted.
pub async fn give(
    store: &dyn GrantStore,
    scope: &GrantScope,
    requested: &[String],
    data: &TemplateData,
) -> Result<GiveOutcome, GiveError> {
    let expanded = template::expand_all(requested, data)?;

    let existing = store.find_permissions(scope).await?;
    let to_grant = missing_permissions(&expanded, &existing);

    if to_grant.is_empty() {
        log_nothing_to_grant(scope, expanded.len());
        return Ok(GiveOutcome::AlreadyGranted(expanded));
    }

    match store.insert_grants(scope, &to_grant).await {
        Ok(()) => {
            log_granted(scope, &to_grant);
            Ok(GiveOutcome::Granted(to_grant))
        }
        Err(StoreError::DuplicateGrant { permission }) => {
            log::warn!(
                "Concurrent grant of '{}' for {} on {}, granting the rest one by one",
                permission,
                scope.identity,
                scope.service
            );
            give_one_by_one(store, scope, expanded).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Slow path after a lost race. Terminates after one insert per permission.
async fn give_one_by_one(
    store: &dyn GrantStore,
    scope: &GrantScope,
    expanded: Vec<String>,
) -> Result<GiveOutcome, GiveError> {
    let existing = store.find_permissions(scope).await?;
    let mut granted = Vec::new();

    for permission in missing_permissions(&expanded, &existing) {
        match store.insert_grants(scope, std::slice::from_ref(&permission)).await {
            Ok(()) => granted.push(permission),
            Err(StoreError::DuplicateGrant { .. }) => {
                log::debug!("'{}' was granted concurrently, skipping", permission);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if granted.is_empty() {
        log_nothing_to_grant(scope, expanded.len());
        return Ok(GiveOutcome::AlreadyGranted(expanded));
    }

    log_granted(scope, &granted);
    Ok(GiveOutcome::Granted(granted))
}

fn log_granted(scope: &GrantScope, permissions: &[String]) {
    log::info!(
        "Granted {:?} to {} on {} by {}",
        permissions,
        scope.identity,
        scope.service,
        scope.created_by
    );
}

fn log_nothing_to_grant(scope: &GrantScope, requested: usize) {
    log::debug!(
        "All {} permission(s) already granted to {} on {} by {}",
        requested,
        scope.identity,
        scope.service,
        scope.created_by
    );
}
