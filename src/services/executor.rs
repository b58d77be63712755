use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout};
use tracing::{debug, warn};

use crate::{
    error::AppError,
    models::{ProbeOutcome, ProbeStatus, Target, UNKNOWN_NAME},
    services::{identity::AgentIdentity, transport::ProbeTransport},
};

/// 传输层超时之外的兜底余量
const CHECK_GRACE: Duration = Duration::from_secs(1);

/// 单目标探测执行器
///
/// 探测永不失败：所有错误都折叠为 `DOWN`
#[derive(Clone)]
pub struct ProbeExecutor {
    transport: Arc<dyn ProbeTransport>,
    identity: AgentIdentity,
    probe_timeout: Duration,
    inspect_timeout: Duration,
    resolve_names: bool,
}

impl std::fmt::Debug for ProbeExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeExecutor")
            .field("transport", &self.transport.kind())
            .field("identity", &self.identity)
            .field("probe_timeout", &self.probe_timeout)
            .finish()
    }
}

impl ProbeExecutor {
    pub fn new(
        transport: Arc<dyn ProbeTransport>,
        identity: AgentIdentity,
        probe_timeout: Duration,
        inspect_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            identity,
            probe_timeout,
            inspect_timeout,
            resolve_names: false,
        }
    }

    /// 每次探测都通过查询接口重新解析显示名
    pub fn with_name_resolution(mut self, resolve_names: bool) -> Self {
        self.resolve_names = resolve_names;
        self
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    /// 探测目标；`service` 存在时检查该服务主机名，否则检查容器本身
    pub async fn probe(&self, target: &Target, service: Option<&str>) -> ProbeOutcome {
        let display_name = self.display_name(target).await;
        let destination = service.unwrap_or(&target.display_name);

        let started = Instant::now();
        let result = match timeout(
            self.probe_timeout + CHECK_GRACE,
            self.transport.check(destination, self.probe_timeout),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::unreachable(format!(
                "{} 检查超时 ({:?})",
                destination, self.probe_timeout
            ))),
        };
        let elapsed = started.elapsed();

        let status = match result {
            Ok(()) => {
                debug!(
                    target_id = %target.id,
                    destination,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "探测成功"
                );
                ProbeStatus::Up
            }
            Err(e) => {
                warn!(
                    target_id = %target.id,
                    destination,
                    agent = %self.identity,
                    error = %e,
                    "探测失败"
                );
                ProbeStatus::Down
            }
        };

        ProbeOutcome::new(target, display_name, service, elapsed, status)
    }

    async fn display_name(&self, target: &Target) -> String {
        if !self.resolve_names && !target.display_name.is_empty() {
            return target.display_name.clone();
        }

        match timeout(
            self.inspect_timeout,
            self.transport.inspect_name(&target.id, self.inspect_timeout),
        )
        .await
        {
            Ok(Ok(name)) => name,
            Ok(Err(e)) => {
                debug!(target_id = %target.id, error = %e, "解析容器名称失败");
                UNKNOWN_NAME.to_string()
            }
            Err(_) => {
                debug!(target_id = %target.id, "解析容器名称超时");
                UNKNOWN_NAME.to_string()
            }
        }
    }
}
