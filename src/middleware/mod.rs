mod auth;
mod error_handler;

pub use auth::{SESSION_ID_HEADER, auth_middleware};
pub use error_handler::log_errors;
