use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 网关配置
///
/// 上游身份服务的地址是必填项，缺失时进程在启动阶段直接失败，
/// 绝不带着残缺配置对外提供服务。
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub identity_host: String,
    pub identity_port: u16,
    pub redis_url: String,
    pub profile_cache_ttl_secs: u64,
    pub upstream_timeout_secs: u64,
    pub server_host: String,
    pub server_port: u16,
}

/// 配置加载错误，一次性列出所有缺失/非法的环境变量
#[derive(Debug)]
pub struct ConfigError {
    pub missing: Vec<&'static str>,
    pub invalid: Vec<&'static str>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.missing.is_empty() {
            write!(f, "missing env vars: {}", self.missing.join(", "))?;
            if !self.invalid.is_empty() {
                write!(f, "; ")?;
            }
        }
        if !self.invalid.is_empty() {
            write!(f, "invalid env vars: {}", self.invalid.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值查找函数构造配置，便于测试
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        let identity_host = require(lookup("IDENTITY_SERVICE_HOST"), "IDENTITY_SERVICE_HOST", &mut missing);
        let identity_port =
            require_parsed::<u16>(lookup("IDENTITY_SERVICE_PORT"), "IDENTITY_SERVICE_PORT", &mut missing, &mut invalid);
        let redis_url = require(lookup("REDIS_URL"), "REDIS_URL", &mut missing);

        let profile_cache_ttl_secs =
            parse_or_default(lookup("PROFILE_CACHE_TTL"), 900, "PROFILE_CACHE_TTL", &mut invalid);
        let upstream_timeout_secs =
            parse_or_default(lookup("UPSTREAM_TIMEOUT_SECS"), 5, "UPSTREAM_TIMEOUT_SECS", &mut invalid);
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "::".to_string());
        let server_port = parse_or_default(lookup("SERVER_PORT"), 3000, "SERVER_PORT", &mut invalid);

        if !missing.is_empty() || !invalid.is_empty() {
            return Err(ConfigError { missing, invalid });
        }

        Ok(Config {
            identity_host,
            identity_port,
            redis_url,
            profile_cache_ttl_secs,
            upstream_timeout_secs,
            server_host,
            server_port,
        })
    }

    /// 上游身份服务的基础URL
    pub fn identity_base_url(&self) -> String {
        format!("http://{}:{}", self.identity_host, self.identity_port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn require(raw: Option<String>, key: &'static str, missing: &mut Vec<&'static str>) -> String {
    match raw {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            missing.push(key);
            String::new()
        }
    }
}

fn require_parsed<T: FromStr + Default>(
    raw: Option<String>,
    key: &'static str,
    missing: &mut Vec<&'static str>,
    invalid: &mut Vec<&'static str>,
) -> T {
    match raw {
        Some(v) => v.parse().unwrap_or_else(|_| {
            invalid.push(key);
            T::default()
        }),
        None => {
            missing.push(key);
            T::default()
        }
    }
}

fn parse_or_default<T: FromStr>(
    raw: Option<String>,
    default: T,
    key: &'static str,
    invalid: &mut Vec<&'static str>,
) -> T {
    match raw {
        Some(v) => v.parse().unwrap_or_else(|_| {
            invalid.push(key);
            default
        }),
        None => default,
    }
}
