//! Permission-grant lifecycle: template expansion, idempotent give,
//! revoke and possession queries. Everything here reaches persistence only
//! through [`crate::engine::GrantStore`].

pub mod grants;
pub mod query;
pub mod revoke;
pub mod template;

pub use grants::{give, GiveError, GiveOutcome};
pub use query::{has, list, HasReport, PermissionCheck, PermissionList};
pub use revoke::lose;
pub use template::{expand, TemplateError};
