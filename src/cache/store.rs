use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

/// 缓存存储接口
///
/// 所有传输层错误都在实现内部吸收并记录日志：调用方只会观察到
/// 未命中，缓存故障绝不会向上冒泡成请求级错误。
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    /// 写入带过期时间的条目，`ttl_secs` 必须为正
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64);

    async fn del(&self, key: &str);

    /// 一次管道往返读取多个键，返回值与键一一对应
    async fn mget(&self, keys: &[String]) -> Vec<Option<String>>;

    /// 一次往返删除多个键
    async fn del_many(&self, keys: &[String]);
}

/// 基于 Redis 的缓存存储
pub struct RedisCacheStore {
    redis: Arc<RedisClient>,
}

impl RedisCacheStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }

    async fn try_get(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        conn.get(key).await
    }

    async fn try_set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn try_del(&self, keys: &[String]) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.del(keys).await?;
        Ok(())
    }

    async fn try_mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, redis::RedisError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        conn.mget(keys).await
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Option<String> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Redis GET failed for key {}: {}", key, e);
                None
            }
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) {
        if let Err(e) = self.try_set_ex(key, value, ttl_secs).await {
            tracing::warn!("Redis SETEX failed for key {}: {}", key, e);
        }
    }

    async fn del(&self, key: &str) {
        let keys = [key.to_string()];
        if let Err(e) = self.try_del(&keys).await {
            tracing::warn!("Redis DEL failed for key {}: {}", key, e);
        }
    }

    async fn mget(&self, keys: &[String]) -> Vec<Option<String>> {
        if keys.is_empty() {
            return Vec::new();
        }
        match self.try_mget(keys).await {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("Redis MGET failed for {} keys: {}", keys.len(), e);
                vec![None; keys.len()]
            }
        }
    }

    async fn del_many(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        if let Err(e) = self.try_del(keys).await {
            tracing::warn!("Redis DEL failed for {} keys: {}", keys.len(), e);
        }
    }
}
