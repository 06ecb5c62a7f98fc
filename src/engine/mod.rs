mod memory_store;
mod sqlite_store;
mod store;

pub use memory_store::InMemoryGrantStore;
pub use sqlite_store::{SqliteGrantStore, SqliteLocation};
pub use store::{GrantStore, StoreError};

use crate::config::ServiceConfig;
use std::sync::Arc;

/// Connection string selecting the in-process store.
pub const MEMORY_CONNECTION: &str = "memory://";

fn is_memory_connection(connection: &str) -> bool {
    connection == MEMORY_CONNECTION || connection == "memory"
}

/// Whether grants written through `connection` vanish when the process exits.
pub fn is_ephemeral(connection: &str) -> bool {
    let connection = connection.trim();
    is_memory_connection(connection)
        || matches!(SqliteLocation::parse(connection), Ok(SqliteLocation::Memory))
}

/// Open the grant store selected by `config.connection_string`.
pub async fn open_store(config: &ServiceConfig) -> Result<Arc<dyn GrantStore>, StoreError> {
    let connection = config.connection_string.trim();

    if is_memory_connection(connection) {
        log::info!("Using in-memory grant store");
        return Ok(Arc::new(InMemoryGrantStore::new()));
    }

    let store = SqliteGrantStore::connect(connection, config.max_connections).await?;
    log::info!("Using SQLite grant store at {}", connection);
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GrantScope;

    #[tokio::test]
    async fn test_open_memory_store() {
        let config = ServiceConfig {
            connection_string: MEMORY_CONNECTION.to_string(),
            ..ServiceConfig::default()
        };

        let store = open_store(&config).await.unwrap();
        let scope = GrantScope::new(1, "billing", "alice");
        store.insert_grants(&scope, &["read".to_string()]).await.unwrap();
        assert_eq!(store.find_permissions(&scope).await.unwrap(), vec!["read".to_string()]);
    }

    #[tokio::test]
    async fn test_open_default_store_is_sqlite_memory() {
        let store = open_store(&ServiceConfig::default()).await.unwrap();
        let scope = GrantScope::new(1, "billing", "alice");
        assert!(store.find_grants(&scope).await.unwrap().is_empty());
    }

    #[test]
    fn test_is_ephemeral() {
        assert!(is_ephemeral("memory://"));
        assert!(is_ephemeral("sqlite::memory:"));
        assert!(is_ephemeral(" :memory: "));
        assert!(!is_ephemeral("sqlite://./grants.db"));
        assert!(!is_ephemeral("/var/lib/ledger/grants.db"));
        assert!(!is_ephemeral("mysql://localhost/grants"));
    }

    #[tokio::test]
    async fn test_open_rejects_unknown_scheme() {
        let config = ServiceConfig {
            connection_string: "mysql://localhost/grants".to_string(),
            ..ServiceConfig::default()
        };

        let result = open_store(&config).await;
        assert!(matches!(result, Err(StoreError::InvalidConnectionString(_))));
    }
}
