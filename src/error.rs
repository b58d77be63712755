use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::response::{ApiResponse, ResponseCode};

/// 结果投递失败的具体原因
///
/// 编排循环不区分两者，只用于诊断日志
#[derive(Error, Debug)]
pub enum DeliveryFailure {
    #[error("传输失败: {0}")]
    Transport(String),

    #[error("收集端返回非成功状态: status={status}, body_preview={body_preview}")]
    Status { status: u16, body_preview: String },
}

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("容器发现失败: {0}")]
    Discovery(String),

    #[error("目标不可达: {0}")]
    Unreachable(String),

    #[error("结果投递失败: {0}")]
    Delivery(#[from] DeliveryFailure),

    #[error("无法确定探测代理身份: {0}")]
    Identity(String),

    #[error("内部错误: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("请求参数错误: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AppError::Database(_) => (ResponseCode::DATABASE_ERROR, self.to_string()),
            AppError::Io(_) => (ResponseCode::INTERNAL_ERROR, "文件IO错误".to_string()),
            AppError::Config(_) => (ResponseCode::INTERNAL_ERROR, "配置错误".to_string()),
            AppError::Discovery(_)
            | AppError::Unreachable(_)
            | AppError::Delivery(_)
            | AppError::Identity(_) => {
                (ResponseCode::INTERNAL_ERROR, self.to_string())
            }
            AppError::Internal(_) => (
                ResponseCode::SERVICE_UNAVAILABLE,
                "服务暂不可用".to_string(),
            ),
            AppError::BadRequest(msg) => (ResponseCode::BAD_REQUEST, msg.clone()),
        };

        // 记录错误日志
        tracing::error!("应用错误: {}", self);

        ApiResponse::<()>::error(code, message).into_response()
    }
}

/// 应用程序Result类型别名
pub type AppResult<T> = Result<T, AppError>;

/// 错误构造辅助函数
impl AppError {
    pub fn bad_request<T: Into<String>>(msg: T) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn service_unavailable<T: Into<String>>(msg: T) -> Self {
        Self::Internal(anyhow::anyhow!(msg.into()))
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn discovery<T: Into<String>>(msg: T) -> Self {
        Self::Discovery(msg.into())
    }

    pub fn unreachable<T: Into<String>>(msg: T) -> Self {
        Self::Unreachable(msg.into())
    }

    pub fn identity<T: Into<String>>(msg: T) -> Self {
        Self::Identity(msg.into())
    }

    pub fn delivery_transport<T: Into<String>>(msg: T) -> Self {
        Self::Delivery(DeliveryFailure::Transport(msg.into()))
    }

    pub fn delivery_status<T: Into<String>>(status: u16, body_preview: T) -> Self {
        Self::Delivery(DeliveryFailure::Status {
            status,
            body_preview: body_preview.into(),
        })
    }
}
