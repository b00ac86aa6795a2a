use std::sync::Arc;

use crate::cache::keys::session_key;
use crate::cache::{CacheStore, SessionRecord};
use crate::upstream::{IdentityUpstream, ProfileFetch, SessionCheck};

/// 会话解析器
///
/// 把入站会话标识翻译成已认证身份：优先读缓存，未命中时回源到
/// 身份服务校验，成功后把组装好的记录写回缓存。所有内部故障
/// （缓存不可用、上游超时、报文解析失败）都在这一层吸收，
/// 调用方只会看到"解析到了"或"没解析到"。
pub struct SessionResolver {
    cache: Arc<dyn CacheStore>,
    upstream: Arc<dyn IdentityUpstream>,
}

impl SessionResolver {
    pub fn new(cache: Arc<dyn CacheStore>, upstream: Arc<dyn IdentityUpstream>) -> Self {
        Self { cache, upstream }
    }

    /// 解析会话标识
    ///
    /// 缓存命中是快速路径，不产生任何网络调用。
    pub async fn resolve(&self, session_id: &str) -> Option<SessionRecord> {
        let key = session_key(session_id);

        if let Some(json) = self.cache.get(&key).await {
            match serde_json::from_str::<SessionRecord>(&json) {
                Ok(record) => return Some(record),
                // 解析失败按未命中处理，继续回源
                Err(e) => {
                    tracing::warn!("Discarding malformed cache entry for {}: {}", key, e);
                }
            }
        }

        let validated = match self.upstream.validate_session(session_id).await {
            SessionCheck::Valid(v) => v,
            SessionCheck::Invalid => {
                tracing::debug!("Session {} rejected by upstream", session_id);
                return None;
            }
            SessionCheck::Unavailable => {
                tracing::warn!("Session {} unresolvable, identity service unavailable", session_id);
                return None;
            }
        };

        // 校验响应里带了可用的用户资料就直接采用，否则再走一次资料接口；
        // 没有可解析资料的会话对下游没有意义，按未认证处理
        let user = match validated.user {
            Some(user) => user,
            None => match self.upstream.fetch_session_profile(&validated.access_token).await {
                ProfileFetch::Found(user) => user,
                ProfileFetch::Missing | ProfileFetch::Unavailable => {
                    tracing::warn!("Session {} validated but profile fetch failed", session_id);
                    return None;
                }
            },
        };

        let record = SessionRecord {
            session_id: session_id.to_string(),
            access_token: validated.access_token,
            user,
            expires_at: validated.expires_at,
        };

        // TTL 从上游签发的过期时间推导，已过期的记录不写缓存
        let ttl = remaining_ttl_secs(record.expires_at, chrono::Utc::now().timestamp_millis());
        if ttl > 0 {
            match serde_json::to_string(&record) {
                Ok(json) => self.cache.set_ex(&key, &json, ttl as u64).await,
                Err(e) => tracing::warn!("Failed to serialize session record for {}: {}", key, e),
            }
        }

        Some(record)
    }

    /// 使指定会话的缓存失效，幂等且不报告键是否存在
    pub async fn invalidate(&self, session_id: &str) {
        self.cache.del(&session_key(session_id)).await;
    }
}

/// 距离过期还剩多少整秒，向上取整
fn remaining_ttl_secs(expires_at_ms: i64, now_ms: i64) -> i64 {
    let diff = expires_at_ms - now_ms;
    let (quot, rem) = (diff / 1000, diff % 1000);
    if rem > 0 { quot + 1 } else { quot }
}
