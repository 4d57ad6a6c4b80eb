mod auth;
mod upload;

pub use auth::{require_admin, require_auth};
pub use upload::alert_on_oversized_upload;
