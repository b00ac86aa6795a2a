use std::sync::Arc;

use config::Config;
use session::{ProfileFetcher, SessionResolver};

pub mod cache;
pub mod config;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod upstream;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub resolver: Arc<SessionResolver>,
    pub profiles: Arc<ProfileFetcher>,
}
