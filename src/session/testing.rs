//! 测试替身：带调用计数的内存缓存和脚本化上游

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::cache::{CacheStore, UserProfile};
use crate::upstream::{IdentityUpstream, ProfileFetch, SessionCheck, ValidatedSession};

pub(crate) fn profile(user_id: &str, username: &str) -> UserProfile {
    UserProfile {
        user_id: user_id.to_string(),
        username: username.to_string(),
        nickname: None,
        avatar: None,
        role: None,
    }
}

/// 内存缓存，记录值、TTL和各操作的调用次数
#[derive(Default)]
pub(crate) struct MemoryCacheStore {
    entries: Mutex<HashMap<String, (String, u64)>>,
    pub get_calls: AtomicUsize,
    pub mget_calls: AtomicUsize,
    pub set_calls: AtomicUsize,
    pub del_many_calls: AtomicUsize,
}

impl MemoryCacheStore {
    pub fn insert(&self, key: &str, value: &str, ttl_secs: u64) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), ttl_secs));
    }

    pub fn entry(&self, key: &str) -> Option<(String, u64)> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.insert(key, value, ttl_secs);
    }

    async fn del(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    async fn mget(&self, keys: &[String]) -> Vec<Option<String>> {
        self.mget_calls.fetch_add(1, Ordering::SeqCst);
        let entries = self.entries.lock().unwrap();
        keys.iter()
            .map(|key| entries.get(key).map(|(v, _)| v.clone()))
            .collect()
    }

    async fn del_many(&self, keys: &[String]) {
        self.del_many_calls.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap();
        for key in keys {
            entries.remove(key);
        }
    }
}

/// 脚本化上游，按预置结果应答并计数
pub(crate) struct StubUpstream {
    check: SessionCheck,
    session_profile: ProfileFetch,
    user_profiles: HashMap<String, ProfileFetch>,
    pub validate_calls: AtomicUsize,
    pub session_profile_calls: AtomicUsize,
    pub user_profile_calls: AtomicUsize,
}

impl StubUpstream {
    pub fn valid(session: ValidatedSession, session_profile: ProfileFetch) -> Self {
        Self::scripted(SessionCheck::Valid(session), session_profile)
    }

    pub fn invalid() -> Self {
        Self::scripted(SessionCheck::Invalid, ProfileFetch::Missing)
    }

    pub fn unavailable() -> Self {
        Self::scripted(SessionCheck::Unavailable, ProfileFetch::Unavailable)
    }

    pub fn with_user_profile(mut self, user_id: &str, outcome: ProfileFetch) -> Self {
        self.user_profiles.insert(user_id.to_string(), outcome);
        self
    }

    fn scripted(check: SessionCheck, session_profile: ProfileFetch) -> Self {
        Self {
            check,
            session_profile,
            user_profiles: HashMap::new(),
            validate_calls: AtomicUsize::new(0),
            session_profile_calls: AtomicUsize::new(0),
            user_profile_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityUpstream for StubUpstream {
    async fn validate_session(&self, _session_id: &str) -> SessionCheck {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.check.clone()
    }

    async fn fetch_session_profile(&self, _access_token: &str) -> ProfileFetch {
        self.session_profile_calls.fetch_add(1, Ordering::SeqCst);
        self.session_profile.clone()
    }

    async fn fetch_user_profile(&self, user_id: &str) -> ProfileFetch {
        self.user_profile_calls.fetch_add(1, Ordering::SeqCst);
        self.user_profiles
            .get(user_id)
            .cloned()
            .unwrap_or(ProfileFetch::Missing)
    }
}
