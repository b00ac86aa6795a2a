pub mod profile;
pub mod session;

use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::utils::success_to_api_response;

/// 健康检查，公开路由
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        success_to_api_response(serde_json::json!({ "status": "ok" })),
    )
}
