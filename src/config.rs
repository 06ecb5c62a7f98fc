//! Service configuration
//!
//! Configuration is an explicit JSON file passed at startup. Lookup order:
//! an explicit path, then `PERMISSION_LEDGER_CONFIG`, then
//! `$USER_HOME/.permission-ledger/config.json`.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "PERMISSION_LEDGER_CONFIG";

pub const DEFAULT_CONNECTION_STRING: &str = "sqlite::memory:";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:47200";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    /// Selects the backing store: `memory://`, `sqlite::memory:`,
    /// `sqlite://<path>` or a bare SQLite file path
    pub connection_string: String,

    /// HTTP listen address used by `serve`
    pub bind_address: String,

    /// SQLite pool size
    pub max_connections: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            connection_string: DEFAULT_CONNECTION_STRING.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Resolve the config file path.
pub fn get_config_path(explicit: Option<&Path>) -> Result<PathBuf, String> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(env_path));
    }

    let home_dir = dirs::home_dir().ok_or("Failed to get user home directory")?;
    Ok(home_dir.join(".permission-ledger").join("config.json"))
}

/// Connection string for a SQLite file under the user data directory.
pub fn default_file_connection() -> Result<String, String> {
    let data_dir = dirs::data_dir().ok_or("Failed to get user data directory")?;
    let path = data_dir.join("permission-ledger").join("grants.db");
    Ok(format!("sqlite://{}", path.display()))
}

/// Load configuration from disk.
///
/// A missing file yields the defaults; nothing is written.
pub fn load_config(explicit: Option<&Path>) -> Result<ServiceConfig, String> {
    let config_path = get_config_path(explicit)?;

    if !config_path.exists() {
        log::debug!("No config at {}, using defaults", config_path.display());
        return Ok(ServiceConfig::default());
    }

    let content = fs::read_to_string(&config_path)
        .map_err(|e| format!("Failed to read config file: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
}

/// Save configuration as pretty JSON, creating parent directories.
pub fn save_config(config: &ServiceConfig, explicit: Option<&Path>) -> Result<PathBuf, String> {
    let config_path = get_config_path(explicit)?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    fs::write(&config_path, content).map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(config_path)
}
