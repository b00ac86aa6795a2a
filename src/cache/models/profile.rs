use serde::{Deserialize, Serialize};

/// 用户资料快照
///
/// 缓存中的资料是写入时刻的快照，允许在一个TTL窗口内存在陈旧数据。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "id")]
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}
