use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    handlers::AppState,
    models::{CreatePingResultRequest, PingResult},
    repositories::PingResultRepository,
    response::ApiResponse,
};

/// 列表查询参数
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PingResultQueryParams {
    /// 返回条数上限，缺省返回全部
    pub limit: Option<i64>,
}

fn repository(app_state: &AppState) -> Result<PingResultRepository, AppError> {
    app_state
        .database
        .as_ref()
        .map(|db| PingResultRepository::new(db.clone()))
        .ok_or_else(|| AppError::service_unavailable("数据库不可用"))
}

#[utoipa::path(
    post,
    path = "/ping-results",
    request_body = CreatePingResultRequest,
    responses(
        (status = 200, description = "探测结果已保存", body = ApiResponse<PingResult>),
        (status = 400, description = "请求参数错误"),
        (status = 503, description = "数据库不可用")
    ),
    tag = "探测结果"
)]
pub async fn create_ping_result(
    State(app_state): State<AppState>,
    Json(request): Json<CreatePingResultRequest>,
) -> Result<Json<ApiResponse<PingResult>>, AppError> {
    request.validate().map_err(AppError::bad_request)?;
    let repo = repository(&app_state)?;

    let saved = repo.create(&request).await?;
    tracing::info!(
        container_id = %saved.container_id,
        status = %saved.status,
        service = ?saved.service,
        "已保存探测结果"
    );

    let msg = format!("探测结果已保存: {} - {}", saved.container_id, saved.status);
    Ok(Json(ApiResponse::success_with_message(saved, msg)))
}

#[utoipa::path(
    get,
    path = "/ping-results/all",
    params(PingResultQueryParams),
    responses(
        (status = 200, description = "按时间倒序的探测记录", body = Vec<PingResult>),
        (status = 503, description = "数据库不可用")
    ),
    tag = "探测结果"
)]
pub async fn list_ping_results(
    State(app_state): State<AppState>,
    Query(params): Query<PingResultQueryParams>,
) -> Result<Json<Vec<PingResult>>, AppError> {
    if matches!(params.limit, Some(limit) if limit <= 0) {
        return Err(AppError::bad_request("limit 必须大于0"));
    }
    let repo = repository(&app_state)?;
    Ok(Json(repo.list(params.limit).await?))
}

#[utoipa::path(
    get,
    path = "/ping-results/latest-up-per-container",
    responses(
        (status = 200, description = "每个容器最近一次 UP 记录", body = Vec<PingResult>),
        (status = 503, description = "数据库不可用")
    ),
    tag = "探测结果"
)]
pub async fn latest_up_per_container(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<PingResult>>, AppError> {
    let repo = repository(&app_state)?;
    Ok(Json(repo.latest_up_per_container().await?))
}
