use serde::Serialize;

use crate::cache::UserProfile;

#[derive(Debug, Serialize)]
pub struct CurrentSessionResponse {
    pub user: UserProfile,
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {}
