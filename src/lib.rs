pub mod capabilities;
pub mod config;
pub mod engine;
pub mod ipc;
pub mod models;
pub mod service;
pub mod state;
pub mod utils;

pub use config::ServiceConfig;
pub use engine::{GrantStore, InMemoryGrantStore, SqliteGrantStore, StoreError};
pub use service::PermissionService;
pub use state::AppState;
