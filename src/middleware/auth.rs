use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::utils::{error_codes, error_to_api_response};

/// 携带会话标识的请求头
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// 认证中间件
///
/// 读取 `x-session-id` 并通过会话解析器换取身份。解析成功把
/// `SessionRecord` 挂到请求扩展上放行；失败一律按未认证拒绝，
/// 调用方看不到缓存或上游层的内部错误细节。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let session_id = req
        .headers()
        .get(SESSION_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let Some(session_id) = session_id else {
        return (
            StatusCode::UNAUTHORIZED,
            error_to_api_response::<()>(error_codes::AUTH_FAILED, "缺少会话标识".to_string()),
        )
            .into_response();
    };

    match state.resolver.resolve(&session_id).await {
        Some(record) => {
            req.extensions_mut().insert(record);
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            error_to_api_response::<()>(error_codes::AUTH_FAILED, "会话无效或已过期".to_string()),
        )
            .into_response(),
    }
}
