use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::models::ContainerSummary;
use bollard::{API_DEFAULT_VERSION, Docker};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::Target,
};

/// 探测目标发现
#[async_trait]
pub trait TargetDiscovery: Send + Sync {
    /// 返回挂载在 `network` 上的全部容器；没有匹配时返回空列表
    async fn discover(&self, network: &str) -> AppResult<Vec<Target>>;
}

/// 连接 Docker 套接字
pub(crate) fn connect_docker(socket_path: &str, timeout: Duration) -> AppResult<Docker> {
    Docker::connect_with_unix(socket_path, timeout.as_secs().max(1), API_DEFAULT_VERSION)
        .map_err(|e| AppError::discovery(format!("连接Docker失败 ({}): {}", socket_path, e)))
}

/// 基于 Docker Engine API 的目标发现
///
/// 每次调用新建并释放一个客户端，不跨调用缓存连接
#[derive(Debug, Clone)]
pub struct DockerDiscovery {
    socket_path: String,
    timeout: Duration,
}

impl DockerDiscovery {
    pub fn new(socket_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl TargetDiscovery for DockerDiscovery {
    async fn discover(&self, network: &str) -> AppResult<Vec<Target>> {
        let docker = connect_docker(&self.socket_path, self.timeout)?;

        let mut filters = HashMap::new();
        filters.insert("network".to_string(), vec![network.to_string()]);
        let options = ListContainersOptions {
            filters,
            ..Default::default()
        };

        let summaries = timeout(self.timeout, docker.list_containers(Some(options)))
            .await
            .map_err(|_| AppError::discovery(format!("列出容器超时 ({:?})", self.timeout)))?
            .map_err(|e| AppError::discovery(format!("列出容器失败: {}", e)))?;

        let targets = targets_from_summaries(summaries, network);
        debug!(network, count = targets.len(), "容器发现完成");
        Ok(targets)
    }
}

/// 将容器列表转换为探测目标，跳过缺少ID的条目
pub fn targets_from_summaries(summaries: Vec<ContainerSummary>, network: &str) -> Vec<Target> {
    summaries
        .into_iter()
        .filter_map(|summary| {
            let id = summary.id.filter(|id| !id.is_empty())?;
            let name = summary.names.as_ref().and_then(|names| names.first());
            let ip_address = summary
                .network_settings
                .and_then(|settings| settings.networks)
                .and_then(|mut networks| networks.remove(network))
                .and_then(|endpoint| endpoint.ip_address);
            Some(Target::new(&id, name.map(String::as_str)).with_ip_address(ip_address))
        })
        .collect()
}
