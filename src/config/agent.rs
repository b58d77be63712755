use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 可达性检查的传输方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// 进程内检查：TCP 建连 + Docker API 查询名称
    #[default]
    Native,
    /// 调用外部命令：ping / docker inspect
    Subprocess,
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(TransportKind::Native),
            "subprocess" => Ok(TransportKind::Subprocess),
            _ => Err(format!("未知的传输方式: {}", s)),
        }
    }
}

/// 探测代理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// 要发现的容器网络名称
    pub network: String,
    /// 收集端接收探测结果的地址
    pub collector_url: String,
    /// 两轮探测之间的间隔（秒）
    pub interval_secs: u64,
    /// 需要额外探测的服务主机名，为空时只探测容器本身
    pub services: Vec<String>,
    /// 可达性检查方式
    pub transport: TransportKind,
    /// 单次可达性检查超时（秒）
    pub probe_timeout_secs: u64,
    /// 结果投递超时（秒）
    pub report_timeout_secs: u64,
    /// 容器发现超时（秒）
    pub discovery_timeout_secs: u64,
    /// 容器名称查询超时（秒）
    pub inspect_timeout_secs: u64,
    /// 单轮内最大并发探测数
    pub max_concurrent_probes: usize,
    /// Docker 套接字路径
    pub docker_socket: String,
    /// native 方式下建连使用的端口
    pub tcp_port: u16,
    /// subprocess 方式下是否通过 docker exec 在代理自身容器内执行 ping
    pub exec_in_self: bool,
    /// 即使发现阶段已有名称，也通过查询接口重新解析显示名
    pub resolve_names: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            network: "vk_default".to_string(),
            collector_url: "http://api:8080/ping-results".to_string(),
            interval_secs: 10,
            services: vec!["api".to_string(), "app".to_string(), "postgres".to_string()],
            transport: TransportKind::Native,
            probe_timeout_secs: 1,
            report_timeout_secs: 5,
            discovery_timeout_secs: 10,
            inspect_timeout_secs: 5,
            max_concurrent_probes: 8,
            docker_socket: "/var/run/docker.sock".to_string(),
            tcp_port: 80,
            exec_in_self: false,
            resolve_names: false,
        }
    }
}

impl AgentConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), String> {
        if self.network.trim().is_empty() {
            return Err("网络名称不能为空".to_string());
        }

        if !self.collector_url.starts_with("http://") && !self.collector_url.starts_with("https://")
        {
            return Err("collector_url 必须以 http:// 或 https:// 开头".to_string());
        }

        if self.interval_secs == 0 {
            return Err("探测间隔必须大于0".to_string());
        }

        if self.probe_timeout_secs == 0 || self.report_timeout_secs == 0 {
            return Err("探测与投递超时必须大于0".to_string());
        }

        if self.discovery_timeout_secs == 0 || self.inspect_timeout_secs == 0 {
            return Err("发现与查询超时必须大于0".to_string());
        }

        if self.max_concurrent_probes == 0 {
            return Err("最大并发探测数必须大于0".to_string());
        }

        if self.services.iter().any(|s| s.trim().is_empty()) {
            return Err("服务名称不能为空字符串".to_string());
        }

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn report_timeout(&self) -> Duration {
        Duration::from_secs(self.report_timeout_secs)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn inspect_timeout(&self) -> Duration {
        Duration::from_secs(self.inspect_timeout_secs)
    }
}
