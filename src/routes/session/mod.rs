pub mod handler;
pub mod model;

pub use handler::{current_session, logout};
