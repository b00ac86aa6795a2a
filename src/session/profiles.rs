use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::future::join_all;

use crate::cache::keys::profile_key;
use crate::cache::{CacheStore, UserProfile};
use crate::upstream::{IdentityUpstream, ProfileFetch};

/// 批量资料查询器
///
/// 按用户ID解析资料：一次管道读取覆盖整批键，未命中的并发回源，
/// 取到的资料以固定TTL写回。单个ID失败只会让它从结果里缺席，
/// 永远不会让整批失败。
pub struct ProfileFetcher {
    cache: Arc<dyn CacheStore>,
    upstream: Arc<dyn IdentityUpstream>,
    ttl_secs: u64,
}

impl ProfileFetcher {
    pub fn new(cache: Arc<dyn CacheStore>, upstream: Arc<dyn IdentityUpstream>, ttl_secs: u64) -> Self {
        Self {
            cache,
            upstream,
            ttl_secs,
        }
    }

    /// 批量解析用户资料，解析不到的ID不会出现在结果里
    pub async fn batch_resolve(&self, user_ids: &[String]) -> HashMap<String, UserProfile> {
        // 去重，保持首次出现的顺序
        let mut seen = HashSet::new();
        let ids: Vec<&String> = user_ids.iter().filter(|id| seen.insert(id.as_str())).collect();
        if ids.is_empty() {
            return HashMap::new();
        }

        let keys: Vec<String> = ids.iter().map(|id| profile_key(id)).collect();
        let cached = self.cache.mget(&keys).await;

        let mut result = HashMap::new();
        let mut misses = Vec::new();
        for (i, id) in ids.iter().enumerate() {
            // 缺失或解析失败都按未命中处理
            let hit = cached
                .get(i)
                .and_then(|v| v.as_deref())
                .and_then(|json| serde_json::from_str::<UserProfile>(json).ok());
            match hit {
                Some(profile) => {
                    result.insert((*id).clone(), profile);
                }
                None => misses.push((*id).clone()),
            }
        }

        // 并发回源补齐未命中的ID
        let fetched = join_all(misses.into_iter().map(|id| {
            let upstream = Arc::clone(&self.upstream);
            async move {
                let outcome = upstream.fetch_user_profile(&id).await;
                (id, outcome)
            }
        }))
        .await;

        for (id, outcome) in fetched {
            match outcome {
                ProfileFetch::Found(profile) => {
                    match serde_json::to_string(&profile) {
                        Ok(json) => self.cache.set_ex(&profile_key(&id), &json, self.ttl_secs).await,
                        Err(e) => tracing::warn!("Failed to serialize profile for {}: {}", id, e),
                    }
                    result.insert(id, profile);
                }
                ProfileFetch::Missing => {
                    tracing::debug!("Profile {} not found upstream", id);
                }
                ProfileFetch::Unavailable => {
                    tracing::warn!("Profile {} skipped, identity service unavailable", id);
                }
            }
        }

        result
    }

    /// 使单个用户资料的缓存失效
    pub async fn invalidate_profile(&self, user_id: &str) {
        self.cache.del(&profile_key(user_id)).await;
    }

    /// 一次往返批量失效
    pub async fn invalidate_profiles(&self, user_ids: &[String]) {
        let keys: Vec<String> = user_ids.iter().map(|id| profile_key(id)).collect();
        self.cache.del_many(&keys).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::session::testing::{MemoryCacheStore, StubUpstream, profile};

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn merges_cache_hits_and_upstream_fetches() {
        let cache = Arc::new(MemoryCacheStore::default());
        cache.insert(
            "profile:a",
            &serde_json::to_string(&profile("a", "alice")).unwrap(),
            900,
        );
        let upstream = Arc::new(
            StubUpstream::invalid().with_user_profile("b", ProfileFetch::Found(profile("b", "bob"))),
        );
        let fetcher = ProfileFetcher::new(cache.clone(), upstream.clone(), 900);

        let result = fetcher.batch_resolve(&ids(&["a", "b", "c"])).await;

        assert_eq!(result.len(), 2);
        assert_eq!(result["a"].username, "alice");
        assert_eq!(result["b"].username, "bob");
        assert!(!result.contains_key("c"));

        // 整批只读一次缓存
        assert_eq!(cache.mget_calls.load(Ordering::SeqCst), 1);
        // 只有未命中的 b 和 c 回源
        assert_eq!(upstream.user_profile_calls.load(Ordering::SeqCst), 2);
        // 新取到的 b 已按固定TTL写回
        let (_, ttl) = cache.entry("profile:b").unwrap();
        assert_eq!(ttl, 900);
    }

    #[tokio::test]
    async fn deduplicates_input_ids() {
        let cache = Arc::new(MemoryCacheStore::default());
        let upstream = Arc::new(
            StubUpstream::invalid().with_user_profile("a", ProfileFetch::Found(profile("a", "alice"))),
        );
        let fetcher = ProfileFetcher::new(cache.clone(), upstream.clone(), 900);

        let result = fetcher.batch_resolve(&ids(&["a", "a", "a"])).await;

        assert_eq!(result.len(), 1);
        assert_eq!(upstream.user_profile_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_input_makes_no_cache_call() {
        let cache = Arc::new(MemoryCacheStore::default());
        let upstream = Arc::new(StubUpstream::invalid());
        let fetcher = ProfileFetcher::new(cache.clone(), upstream, 900);

        assert!(fetcher.batch_resolve(&[]).await.is_empty());
        assert_eq!(cache.mget_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn single_upstream_failure_never_aborts_the_batch() {
        let cache = Arc::new(MemoryCacheStore::default());
        let upstream = Arc::new(
            StubUpstream::invalid()
                .with_user_profile("ok", ProfileFetch::Found(profile("ok", "carol")))
                .with_user_profile("down", ProfileFetch::Unavailable),
        );
        let fetcher = ProfileFetcher::new(cache, upstream, 900);

        let result = fetcher.batch_resolve(&ids(&["down", "ok"])).await;

        assert_eq!(result.len(), 1);
        assert!(result.contains_key("ok"));
    }

    #[tokio::test]
    async fn unparsable_cache_entry_is_refetched() {
        let cache = Arc::new(MemoryCacheStore::default());
        cache.insert("profile:a", "garbage", 900);
        let upstream = Arc::new(
            StubUpstream::invalid().with_user_profile("a", ProfileFetch::Found(profile("a", "alice"))),
        );
        let fetcher = ProfileFetcher::new(cache, upstream.clone(), 900);

        let result = fetcher.batch_resolve(&ids(&["a"])).await;

        assert_eq!(result["a"].username, "alice");
        assert_eq!(upstream.user_profile_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_profiles_deletes_in_one_round_trip() {
        let cache = Arc::new(MemoryCacheStore::default());
        cache.insert("profile:a", "x", 900);
        cache.insert("profile:b", "y", 900);
        let fetcher = ProfileFetcher::new(cache.clone(), Arc::new(StubUpstream::invalid()), 900);

        fetcher.invalidate_profiles(&ids(&["a", "b"])).await;

        assert!(cache.entry("profile:a").is_none());
        assert!(cache.entry("profile:b").is_none());
        assert_eq!(cache.del_many_calls.load(Ordering::SeqCst), 1);
    }
}
