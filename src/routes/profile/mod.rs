pub mod handler;
pub mod model;

pub use handler::{batch_query, invalidate};
