use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{
    BatchProfileRequest, BatchProfileResponse, InvalidateProfilesRequest,
    InvalidateProfilesResponse,
};

/// 单次批量查询允许的最大ID数
const MAX_BATCH_SIZE: usize = 100;

/// 批量查询用户资料，解析不到的ID不出现在结果里
#[axum::debug_handler]
pub async fn batch_query(
    State(state): State<AppState>,
    Json(req): Json<BatchProfileRequest>,
) -> impl IntoResponse {
    if req.user_ids.is_empty() {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "用户ID列表不能为空".to_string(),
            ),
        );
    }
    if req.user_ids.len() > MAX_BATCH_SIZE {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                format!("一次最多查询{}个用户", MAX_BATCH_SIZE),
            ),
        );
    }

    let profiles = state.profiles.batch_resolve(&req.user_ids).await;
    (
        StatusCode::OK,
        success_to_api_response(BatchProfileResponse { profiles }),
    )
}

/// 批量失效用户资料缓存，总是报告成功
#[axum::debug_handler]
pub async fn invalidate(
    State(state): State<AppState>,
    Json(req): Json<InvalidateProfilesRequest>,
) -> impl IntoResponse {
    state.profiles.invalidate_profiles(&req.user_ids).await;
    (
        StatusCode::OK,
        success_to_api_response(InvalidateProfilesResponse {}),
    )
}
