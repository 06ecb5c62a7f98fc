use crate::config::ServiceConfig;
use crate::engine::{self, GrantStore, StoreError};
use crate::service::PermissionService;
use std::sync::Arc;

/// Application state shared by the HTTP handlers and the CLI.
///
/// Holds no grant data itself; all of that lives behind the store.
#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub service: PermissionService,
}

impl AppState {
    /// Open the store selected by `config` and wrap it in a service.
    pub async fn from_config(config: ServiceConfig) -> Result<Self, StoreError> {
        let store = engine::open_store(&config).await?;
        Ok(Self::with_store(config, store))
    }

    /// Build state around an already opened store.
    pub fn with_store(config: ServiceConfig, store: Arc<dyn GrantStore>) -> Self {
        Self {
            config,
            service: PermissionService::new(store),
        }
    }
}
