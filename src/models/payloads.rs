use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Values substituted into `{placeholder}` tokens during `give`.
pub type TemplateData = Map<String, Value>;

/// Rejected request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("identity must be a positive integer, got {0}")]
    InvalidIdentity(i64),

    #[error("service must not be empty")]
    EmptyService,

    #[error("permissions must contain at least one entry")]
    EmptyPermissions,

    #[error("malformed request: {0}")]
    Malformed(String),
}

/// Payload for `give`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiveRequest {
    pub identity: i64,
    pub service: String,
    pub permissions: Vec<String>,

    /// Template values; defaults to empty
    #[serde(default)]
    pub data: TemplateData,
}

/// Payload for `lose`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoseRequest {
    pub identity: i64,
    pub service: String,
    pub permissions: Vec<String>,
}

/// Payload for `has`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HasRequest {
    pub identity: i64,
    pub service: String,
    pub permissions: Vec<String>,
}

/// Payload for `list` (exposed as `get` over HTTP).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRequest {
    pub identity: i64,
    pub service: String,
}

fn check_identity(identity: i64) -> Result<(), ValidationError> {
    if identity < 1 {
        return Err(ValidationError::InvalidIdentity(identity));
    }
    Ok(())
}

fn check_service(service: &str) -> Result<(), ValidationError> {
    if service.trim().is_empty() {
        return Err(ValidationError::EmptyService);
    }
    Ok(())
}

fn check_permissions(permissions: &[String]) -> Result<(), ValidationError> {
    if permissions.is_empty() {
        return Err(ValidationError::EmptyPermissions);
    }
    Ok(())
}

impl GiveRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_identity(self.identity)?;
        check_service(&self.service)?;
        check_permissions(&self.permissions)
    }
}

impl LoseRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_identity(self.identity)?;
        check_service(&self.service)?;
        check_permissions(&self.permissions)
    }
}

impl HasRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_identity(self.identity)?;
        check_service(&self.service)?;
        check_permissions(&self.permissions)
    }
}

impl ListRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_identity(self.identity)?;
        check_service(&self.service)
    }
}
