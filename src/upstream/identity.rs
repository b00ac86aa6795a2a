use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::cache::UserProfile;
use crate::middleware::SESSION_ID_HEADER;

use super::{IdentityUpstream, ProfileFetch, SessionCheck, ValidatedSession};

/// 上游统一响应信封
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<T>,
}

/// 会话校验响应体
///
/// 字段全部可缺失，缺什么按校验失败处理，绝不信任上游的报文形状。
#[derive(Debug, Default, Deserialize)]
struct SessionCheckData {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<serde_json::Value>,
}

/// 基于 reqwest 的身份服务客户端
///
/// 共享的 `reqwest::Client` 在启动时构造并带上统一超时，
/// 这里不再做任何额外的超时控制。
pub struct HttpIdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn profile_from_response(
        &self,
        resp: Result<reqwest::Response, reqwest::Error>,
        url: &str,
    ) -> ProfileFetch {
        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Profile request to {} failed: {}", url, e);
                return ProfileFetch::Unavailable;
            }
        };

        let status = resp.status();
        if status.is_server_error() {
            tracing::warn!("Profile request to {} answered {}", url, status);
            return ProfileFetch::Unavailable;
        }
        if !status.is_success() {
            tracing::debug!("Profile request to {} rejected with {}", url, status);
            return ProfileFetch::Missing;
        }

        let envelope: Envelope<serde_json::Value> = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Malformed profile response from {}: {}", url, e);
                return ProfileFetch::Missing;
            }
        };
        if !envelope.success {
            return ProfileFetch::Missing;
        }

        match envelope
            .data
            .and_then(|v| serde_json::from_value::<UserProfile>(v).ok())
        {
            Some(profile) => ProfileFetch::Found(profile),
            None => {
                tracing::debug!("Profile response from {} carried no usable profile", url);
                ProfileFetch::Missing
            }
        }
    }
}

#[async_trait]
impl IdentityUpstream for HttpIdentityClient {
    async fn validate_session(&self, session_id: &str) -> SessionCheck {
        let url = format!("{}/auth/session/check", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header(SESSION_ID_HEADER, session_id)
            .send()
            .await;

        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Session check for {} against {} failed: {}", session_id, url, e);
                return SessionCheck::Unavailable;
            }
        };

        let status = resp.status();
        if status.is_server_error() {
            tracing::warn!("Session check for {} against {} answered {}", session_id, url, status);
            return SessionCheck::Unavailable;
        }
        if !status.is_success() {
            tracing::debug!("Session {} rejected by upstream with {}", session_id, status);
            return SessionCheck::Invalid;
        }

        let envelope: Envelope<SessionCheckData> = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Malformed session check response from {}: {}", url, e);
                return SessionCheck::Invalid;
            }
        };
        if !envelope.success {
            return SessionCheck::Invalid;
        }
        let Some(data) = envelope.data else {
            return SessionCheck::Invalid;
        };
        // 必要凭据字段缺失时按校验失败处理，而不是崩溃或带病返回
        let (Some(access_token), Some(expires_at)) = (data.access_token, data.expires_at) else {
            tracing::warn!("Session check for {} succeeded but omitted credential fields", session_id);
            return SessionCheck::Invalid;
        };

        // 内嵌用户资料解不开就丢弃，留给解析器走资料接口兜底
        let user = data
            .user
            .and_then(|v| serde_json::from_value::<UserProfile>(v).ok());

        SessionCheck::Valid(ValidatedSession {
            access_token,
            expires_at,
            user,
        })
    }

    async fn fetch_session_profile(&self, access_token: &str) -> ProfileFetch {
        let url = format!("{}/auth/profile", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await;
        self.profile_from_response(resp, &url).await
    }

    async fn fetch_user_profile(&self, user_id: &str) -> ProfileFetch {
        let url = format!("{}/users/profile/{}", self.base_url, user_id);
        let resp = self.http.get(&url).send().await;
        self.profile_from_response(resp, &url).await
    }
}
