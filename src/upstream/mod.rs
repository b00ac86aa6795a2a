// 上游身份服务访问模块

pub mod identity;

use async_trait::async_trait;

use crate::cache::UserProfile;

pub use identity::HttpIdentityClient;

/// 会话校验结果
///
/// 对上游响应做防御性解码后的显式结果，调用方不接触原始报文。
#[derive(Debug, Clone)]
pub enum SessionCheck {
    Valid(ValidatedSession),
    /// 上游明确表示会话无效或不存在
    Invalid,
    /// 上游不可达、超时或返回服务端错误
    Unavailable,
}

/// 校验通过的会话凭据
#[derive(Debug, Clone)]
pub struct ValidatedSession {
    pub access_token: String,
    pub expires_at: i64, // Unix 毫秒时间戳
    /// 上游在校验响应中内嵌的用户资料，可能缺失
    pub user: Option<UserProfile>,
}

/// 资料查询结果
#[derive(Debug, Clone)]
pub enum ProfileFetch {
    Found(UserProfile),
    /// 上游明确表示查不到该资料
    Missing,
    /// 上游不可达、超时或返回服务端错误
    Unavailable,
}

/// 上游身份服务接口
#[async_trait]
pub trait IdentityUpstream: Send + Sync {
    /// 校验会话标识，换取访问令牌和过期时间
    async fn validate_session(&self, session_id: &str) -> SessionCheck;

    /// 用刚签发的访问令牌拉取令牌所有者的资料
    async fn fetch_session_profile(&self, access_token: &str) -> ProfileFetch;

    /// 按用户ID拉取资料，独立于任何登录态
    async fn fetch_user_profile(&self, user_id: &str) -> ProfileFetch;
}
