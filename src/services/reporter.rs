use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::ProbeOutcome,
};

/// 探测结果投递
#[async_trait]
pub trait OutcomeReporter: Send + Sync {
    async fn report(&self, outcome: &ProbeOutcome) -> AppResult<()>;
}

/// 通过 HTTP POST 将结果发送到收集端
///
/// 每个结果只尝试一次，失败由调用方记录后丢弃
#[derive(Debug, Clone)]
pub struct ResultReporter {
    http: Client,
    endpoint: String,
}

impl ResultReporter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("创建HTTP客户端失败: {}", e)))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl OutcomeReporter for ResultReporter {
    async fn report(&self, outcome: &ProbeOutcome) -> AppResult<()> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(outcome)
            .send()
            .await
            .map_err(|e| AppError::delivery_transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::delivery_status(
                status.as_u16(),
                text.chars().take(200).collect::<String>(),
            ));
        }

        debug!(
            target_id = %outcome.target_id,
            service = ?outcome.service,
            status = %outcome.status,
            "探测结果已发送"
        );
        Ok(())
    }
}
