/// Utility modules shared by the stores and the service layer.
pub mod time;

pub use time::{now_utc, parse_to_utc};
