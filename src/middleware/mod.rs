pub mod auth;
pub mod timeout;

pub use auth::{CurrentUser, bearer_token, require_access};
pub use timeout::request_timeout;
