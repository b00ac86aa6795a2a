use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use session_gateway::{
    AppState,
    cache::{CacheStore, RedisCacheStore},
    config::Config,
    middleware::{auth_middleware, log_errors},
    routes,
    session::{ProfileFetcher, SessionResolver},
    upstream::{HttpIdentityClient, IdentityUpstream},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(debug_assertions)]
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置，缺失必填项直接退出
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置 Redis 客户端
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");

    // 共享的上游HTTP客户端，带统一超时
    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout())
        .build()
        .expect("Failed to build HTTP client");

    // 组装核心组件，依赖全部显式注入
    let cache: Arc<dyn CacheStore> = Arc::new(RedisCacheStore::new(Arc::new(redis_client)));
    let upstream: Arc<dyn IdentityUpstream> =
        Arc::new(HttpIdentityClient::new(http, config.identity_base_url()));
    let resolver = Arc::new(SessionResolver::new(
        Arc::clone(&cache),
        Arc::clone(&upstream),
    ));
    let profiles = Arc::new(ProfileFetcher::new(
        cache,
        upstream,
        config.profile_cache_ttl_secs,
    ));

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        resolver,
        profiles,
    };

    // 将路由分为公开路由和受保护路由
    let public_routes = Router::new().route("/health", get(routes::health));

    let protected_routes = Router::new()
        // 会话路由
        .route("/session/me", get(routes::session::current_session))
        .route("/session/logout", post(routes::session::logout))
        // 资料路由
        .route("/profiles/batch", post(routes::profile::batch_query))
        .route("/profiles/invalidate", post(routes::profile::invalidate))
        // 应用认证中间件
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new().merge(public_routes).merge(protected_routes);

    // 添加日志中间件
    let router = router.layer(axum::middleware::from_fn(log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // 添加应用状态
    let app = router.with_state(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
