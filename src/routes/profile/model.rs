use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cache::UserProfile;

#[derive(Debug, Deserialize)]
pub struct BatchProfileRequest {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchProfileResponse {
    pub profiles: HashMap<String, UserProfile>,
}

#[derive(Debug, Deserialize)]
pub struct InvalidateProfilesRequest {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateProfilesResponse {}
