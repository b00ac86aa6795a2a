use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{AppState, cache::SessionRecord, utils::success_to_api_response};

use super::model::{CurrentSessionResponse, LogoutResponse};

/// 返回当前会话对应的用户资料
///
/// 认证中间件已把 `SessionRecord` 挂到请求扩展上
#[axum::debug_handler]
pub async fn current_session(Extension(session): Extension<SessionRecord>) -> impl IntoResponse {
    (
        StatusCode::OK,
        success_to_api_response(CurrentSessionResponse {
            user: session.user,
            expires_at: session.expires_at,
        }),
    )
}

/// 登出：使会话缓存立即失效
#[axum::debug_handler]
pub async fn logout(
    Extension(session): Extension<SessionRecord>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    state.resolver.invalidate(&session.session_id).await;
    (StatusCode::OK, success_to_api_response(LogoutResponse {}))
}
