mod grant;
pub mod payloads;
pub mod response;

pub use grant::{normalize_creator, GrantScope, PermissionGrant};
pub use payloads::*;
pub use response::{status_reasons, ServiceResponse};
