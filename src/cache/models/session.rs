use serde::{Deserialize, Serialize};

use super::profile::UserProfile;

/// 会话缓存数据模型
///
/// `expires_at` 由上游身份服务签发，缓存TTL从它推导而来，
/// 因此缓存里的记录要么未过期、要么不存在。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub access_token: String,
    pub user: UserProfile,
    pub expires_at: i64, // Unix 毫秒时间戳
}
