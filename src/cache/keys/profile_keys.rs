/// 用户资料缓存键前缀
const PROFILE_PREFIX: &str = "profile:";

/// 生成用户资料缓存键
pub fn profile_key(user_id: &str) -> String {
    format!("{}{}", PROFILE_PREFIX, user_id)
}
