use crate::error::{AppError, AppResult};

/// 探测代理自身身份（容器内即运行时分配的主机名）
///
/// 进程启动时读取一次，之后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIdentity(String);

impl AgentIdentity {
    pub fn new(hostname: impl Into<String>) -> AppResult<Self> {
        let hostname = hostname.into();
        let hostname = hostname.trim();
        if hostname.is_empty() {
            return Err(AppError::identity("主机名为空"));
        }
        Ok(Self(hostname.to_string()))
    }

    /// 从 `HOSTNAME` 环境变量读取
    pub fn from_env() -> AppResult<Self> {
        let hostname = std::env::var("HOSTNAME")
            .map_err(|_| AppError::identity("未设置 HOSTNAME 环境变量"))?;
        Self::new(hostname)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
