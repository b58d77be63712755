use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

/// 容器短ID长度（与 `docker ps` 展示一致）
pub const SHORT_ID_LEN: usize = 12;

/// 名称查询失败时使用的占位显示名
pub const UNKNOWN_NAME: &str = "unknown";

/// 探测状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeStatus {
    Up,
    Down,
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeStatus::Up => write!(f, "UP"),
            ProbeStatus::Down => write!(f, "DOWN"),
        }
    }
}

impl std::str::FromStr for ProbeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" => Ok(ProbeStatus::Up),
            "DOWN" => Ok(ProbeStatus::Down),
            _ => Err(format!("Invalid probe status: {}", s)),
        }
    }
}

impl TryFrom<String> for ProbeStatus {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl sqlx::encode::Encode<'_, sqlx::Postgres> for ProbeStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>> {
        <String as sqlx::encode::Encode<sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}

impl sqlx::Type<sqlx::Postgres> for ProbeStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

/// 一次发现得到的探测目标
///
/// 每轮重新构建，跨轮不做身份关联
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub display_name: String,
    pub ip_address: Option<String>,
}

impl Target {
    /// 由运行时返回的原始ID与名称构建目标
    pub fn new(raw_id: &str, raw_name: Option<&str>) -> Self {
        let id = short_id(raw_id);
        let display_name = raw_name
            .map(normalize_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| id.clone());
        Self {
            id,
            display_name,
            ip_address: None,
        }
    }

    pub fn with_ip_address(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address.filter(|ip| !ip.is_empty());
        self
    }
}

/// 截取固定长度的短ID
pub fn short_id(raw_id: &str) -> String {
    raw_id.chars().take(SHORT_ID_LEN).collect()
}

/// 去掉 Docker 名称前的 `/`
pub fn normalize_name(raw_name: &str) -> String {
    raw_name.trim_start_matches('/').to_string()
}

/// 单轮去重键，只作为集合成员使用
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    target_id: String,
    service: Option<String>,
}

impl DedupKey {
    pub fn new(target_id: &str, service: Option<&str>) -> Self {
        Self {
            target_id: target_id.to_string(),
            service: service.map(str::to_string),
        }
    }
}

/// 单次探测结果，序列化后即为发送给收集端的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeOutcome {
    #[serde(rename = "container_id")]
    pub target_id: String,
    #[serde(rename = "container_name")]
    pub display_name: String,
    #[serde(rename = "ping_duration")]
    pub duration_seconds: f64,
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl ProbeOutcome {
    pub fn new(
        target: &Target,
        display_name: String,
        service: Option<&str>,
        elapsed: Duration,
        status: ProbeStatus,
    ) -> Self {
        Self {
            target_id: target.id.clone(),
            display_name,
            duration_seconds: elapsed.as_secs_f64(),
            status,
            ip_address: target.ip_address.clone(),
            service: service.map(str::to_string),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == ProbeStatus::Up
    }
}
