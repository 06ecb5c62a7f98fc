//! Operation boundary for the permission ledger.
//!
//! Each call validates its request, normalizes the creator, runs the
//! capability against the injected store and folds every outcome, including
//! failures, into a [`ServiceResponse`].

use crate::capabilities::{self, GiveError, GiveOutcome, TemplateError};
use crate::engine::GrantStore;
use crate::models::{
    normalize_creator, status_reasons, GiveRequest, GrantScope, HasRequest, ListRequest,
    LoseRequest, ServiceResponse, ValidationError,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

/// The four permission operations over a shared grant store.
#[derive(Clone)]
pub struct PermissionService {
    store: Arc<dyn GrantStore>,
}

impl PermissionService {
    pub fn new(store: Arc<dyn GrantStore>) -> Self {
        Self { store }
    }

    /// Grant permissions, skipping those already held.
    pub async fn give(&self, creator: &str, request: GiveRequest) -> ServiceResponse {
        let scope = match prepare(creator, request.identity, &request.service, request.validate()) {
            Ok(scope) => scope,
            Err(response) => return response,
        };

        match capabilities::give(self.store.as_ref(), &scope, &request.permissions, &request.data)
            .await
        {
            Ok(GiveOutcome::Granted(permissions)) => ServiceResponse::ok(
                status_reasons::PERMISSIONS_GIVEN,
                json!({ "permissions": permissions }),
            ),
            Ok(GiveOutcome::AlreadyGranted(permissions)) => {
                ServiceResponse::new(400, status_reasons::PERMISSIONS_ALREADY_GIVEN)
                    .with_data(json!({ "permissions": permissions }))
            }
            Err(GiveError::Template(TemplateError::InvalidPattern(e))) => {
                log::error!("give failed for {} on {}: {}", scope.identity, scope.service, e);
                ServiceResponse::internal(e)
            }
            Err(GiveError::Template(e)) => {
                ServiceResponse::error(422, status_reasons::TEMPLATE_KEY_MISSING, e.to_string())
            }
            Err(GiveError::Store(e)) => {
                log::error!("give failed for {} on {}: {}", scope.identity, scope.service, e);
                ServiceResponse::internal(e.to_string())
            }
        }
    }

    /// Revoke permissions; unknown ones are ignored.
    pub async fn lose(&self, creator: &str, request: LoseRequest) -> ServiceResponse {
        let scope = match prepare(creator, request.identity, &request.service, request.validate()) {
            Ok(scope) => scope,
            Err(response) => return response,
        };

        match capabilities::lose(self.store.as_ref(), &scope, &request.permissions).await {
            Ok(permissions) => ServiceResponse::ok(
                status_reasons::PERMISSIONS_LOST,
                json!({ "permissions": permissions }),
            ),
            Err(e) => {
                log::error!("lose failed for {} on {}: {}", scope.identity, scope.service, e);
                ServiceResponse::internal(e.to_string())
            }
        }
    }

    /// Check whether every requested permission is held.
    pub async fn has(&self, creator: &str, request: HasRequest) -> ServiceResponse {
        let scope = match prepare(creator, request.identity, &request.service, request.validate()) {
            Ok(scope) => scope,
            Err(response) => return response,
        };

        match capabilities::has(self.store.as_ref(), &scope, &request.permissions).await {
            Ok(report) => ServiceResponse::ok(status_reasons::PERMISSIONS_FOUND, json!(report)),
            Err(e) => {
                log::error!("has failed for {} on {}: {}", scope.identity, scope.service, e);
                ServiceResponse::internal(e.to_string())
            }
        }
    }

    /// List every permission granted to identity+service by the creator.
    pub async fn list(&self, creator: &str, request: ListRequest) -> ServiceResponse {
        let scope = match prepare(creator, request.identity, &request.service, request.validate()) {
            Ok(scope) => scope,
            Err(response) => return response,
        };

        match capabilities::list(self.store.as_ref(), &scope).await {
            Ok(result) => ServiceResponse::ok(status_reasons::PERMISSIONS_FOUND, json!(result.permissions))
                .with_meta(json!({ "total": result.total })),
            Err(e) => {
                log::error!("list failed for {} on {}: {}", scope.identity, scope.service, e);
                ServiceResponse::internal(e.to_string())
            }
        }
    }

    /// Dispatch a raw JSON payload by operation name (`give`, `lose`, `has`, `get`/`list`).
    pub async fn handle(&self, operation: &str, creator: &str, payload: Value) -> ServiceResponse {
        match operation {
            "give" => match parse_request(payload) {
                Ok(request) => self.give(creator, request).await,
                Err(response) => response,
            },
            "lose" => match parse_request(payload) {
                Ok(request) => self.lose(creator, request).await,
                Err(response) => response,
            },
            "has" => match parse_request(payload) {
                Ok(request) => self.has(creator, request).await,
                Err(response) => response,
            },
            "get" | "list" => match parse_request(payload) {
                Ok(request) => self.list(creator, request).await,
                Err(response) => response,
            },
            other => ServiceResponse::error(
                404,
                status_reasons::UNKNOWN_OPERATION,
                format!("Unknown operation: {}", other),
            ),
        }
    }
}

/// Deserialize a request payload, mapping failures to a 422 response.
pub fn parse_request<T: DeserializeOwned>(payload: Value) -> Result<T, ServiceResponse> {
    serde_json::from_value(payload).map_err(|e| validation_failed(ValidationError::Malformed(e.to_string())))
}

fn validation_failed(error: ValidationError) -> ServiceResponse {
    ServiceResponse::error(422, status_reasons::VALIDATION_ERROR, error.to_string())
}

/// Check the trusted creator and the request, then build the scope.
fn prepare(
    creator: &str,
    identity: i64,
    service: &str,
    validation: Result<(), ValidationError>,
) -> Result<GrantScope, ServiceResponse> {
    if normalize_creator(creator).is_empty() {
        return Err(ServiceResponse::error(
            401,
            status_reasons::CREATOR_REQUIRED,
            "No creator supplied by the caller context",
        ));
    }

    validation.map_err(validation_failed)?;

    Ok(GrantScope::new(identity, service, creator))
}
