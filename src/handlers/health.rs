use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use std::collections::HashMap;

use crate::{handlers::AppState, response::ApiResponse};

#[derive(Deserialize)]
pub struct HealthQuery {
    #[serde(default)]
    detail: bool,
}

/// 根路径占位
pub async fn placeholder() -> &'static str {
    "Placeholder"
}

/// 健康检查处理器
pub async fn health_check(
    Query(params): Query<HealthQuery>,
) -> Json<ApiResponse<serde_json::Value>> {
    if params.detail {
        let timestamp = chrono::Utc::now().to_rfc3339();
        let mut details = HashMap::new();
        details.insert("status", "healthy");
        details.insert("version", env!("CARGO_PKG_VERSION"));
        details.insert("timestamp", timestamp.as_str());

        Json(ApiResponse::success(serde_json::json!(details)))
    } else {
        Json(ApiResponse::success(serde_json::json!({"status": "ok"})))
    }
}

/// 数据库健康检查处理器
pub async fn db_health_check(State(app_state): State<AppState>) -> ApiResponse<serde_json::Value> {
    match &app_state.database {
        Some(db) => match db.health_check().await {
            Ok(true) => {
                let timestamp = chrono::Utc::now().to_rfc3339();
                let mut details = HashMap::new();
                details.insert("database", "healthy");
                details.insert("timestamp", timestamp.as_str());
                ApiResponse::success(serde_json::json!(details))
            }
            Ok(false) => ApiResponse::error_with_data(
                503,
                "数据库连接异常".to_string(),
                serde_json::json!({"status": "unhealthy"}),
            ),
            Err(e) => {
                tracing::error!("数据库健康检查失败: {}", e);
                ApiResponse::error_with_data(
                    503,
                    format!("数据库健康检查失败: {}", e),
                    serde_json::json!({"status": "error"}),
                )
            }
        },
        None => ApiResponse::error_with_data(
            503,
            "数据库未配置或连接失败".to_string(),
            serde_json::json!({"status": "unavailable"}),
        ),
    }
}
