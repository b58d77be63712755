use async_trait::async_trait;
use bollard::container::InspectContainerOptions;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::{net::TcpStream, process::Command, time::timeout};
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::normalize_name,
    services::discovery::connect_docker,
    services::identity::AgentIdentity,
};

/// 外部命令在自身超时之外额外允许的时间
const SUBPROCESS_GRACE: Duration = Duration::from_secs(1);

/// 可达性检查与名称查询能力
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// 对 `destination` 发起一次可达性检查，成功返回 Ok
    async fn check(&self, destination: &str, timeout: Duration) -> AppResult<()>;

    /// 查询容器的可读名称
    async fn inspect_name(&self, target_id: &str, timeout: Duration) -> AppResult<String>;

    fn kind(&self) -> &'static str;
}

fn validate_destination(destination: &str) -> AppResult<()> {
    if destination.is_empty()
        || destination.starts_with('-')
        || destination.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(AppError::unreachable(format!(
            "非法的探测目标: {:?}",
            destination
        )));
    }
    Ok(())
}

/// 进程内实现：一次 TCP 建连 + Docker API 查询名称
///
/// 对端拒绝连接同样说明主机可达
#[derive(Debug, Clone)]
pub struct NativeTransport {
    port: u16,
    docker_socket: String,
}

impl NativeTransport {
    pub fn new(port: u16, docker_socket: impl Into<String>) -> Self {
        Self {
            port,
            docker_socket: docker_socket.into(),
        }
    }
}

#[async_trait]
impl ProbeTransport for NativeTransport {
    async fn check(&self, destination: &str, limit: Duration) -> AppResult<()> {
        validate_destination(destination)?;

        match timeout(limit, TcpStream::connect((destination, self.port))).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                debug!(destination, port = self.port, "连接被拒绝，主机可达");
                Ok(())
            }
            Ok(Err(e)) => Err(AppError::unreachable(format!(
                "{}:{} 连接失败: {}",
                destination, self.port, e
            ))),
            Err(_) => Err(AppError::unreachable(format!(
                "{}:{} 连接超时 ({:?})",
                destination, self.port, limit
            ))),
        }
    }

    async fn inspect_name(&self, target_id: &str, limit: Duration) -> AppResult<String> {
        let docker = connect_docker(&self.docker_socket, limit)?;
        let details = timeout(
            limit,
            docker.inspect_container(target_id, None::<InspectContainerOptions>),
        )
        .await
        .map_err(|_| AppError::discovery(format!("查询容器 {} 超时", target_id)))?
        .map_err(|e| AppError::discovery(format!("查询容器 {} 失败: {}", target_id, e)))?;

        details
            .name
            .map(|name| normalize_name(&name))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::discovery(format!("容器 {} 没有名称", target_id)))
    }

    fn kind(&self) -> &'static str {
        "native"
    }
}

/// 外部命令实现：`ping -c 1` 与 `docker inspect`
///
/// 配置了 `exec_in` 时通过 `docker exec` 在代理自身容器内执行 ping
#[derive(Debug, Clone)]
pub struct SubprocessTransport {
    exec_in: Option<AgentIdentity>,
}

impl SubprocessTransport {
    pub fn new(exec_in: Option<AgentIdentity>) -> Self {
        Self { exec_in }
    }

    /// 构造 ping 命令（程序名, 参数）
    pub fn ping_command(&self, destination: &str, limit: Duration) -> (String, Vec<String>) {
        let wait_secs = limit.as_secs().max(1).to_string();
        let ping_args = vec![
            "-c".to_string(),
            "1".to_string(),
            "-W".to_string(),
            wait_secs,
            destination.to_string(),
        ];

        match &self.exec_in {
            Some(identity) => {
                let mut args = vec![
                    "exec".to_string(),
                    identity.as_str().to_string(),
                    "ping".to_string(),
                ];
                args.extend(ping_args);
                ("docker".to_string(), args)
            }
            None => ("ping".to_string(), ping_args),
        }
    }

    async fn run(
        program: &str,
        args: &[String],
        limit: Duration,
    ) -> AppResult<std::process::Output> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::unreachable(format!("启动 {} 失败: {}", program, e)))?;

        timeout(limit + SUBPROCESS_GRACE, child.wait_with_output())
            .await
            .map_err(|_| AppError::unreachable(format!("{} 执行超时 ({:?})", program, limit)))?
            .map_err(AppError::from)
    }
}

#[async_trait]
impl ProbeTransport for SubprocessTransport {
    async fn check(&self, destination: &str, limit: Duration) -> AppResult<()> {
        validate_destination(destination)?;

        let (program, args) = self.ping_command(destination, limit);
        let output = Self::run(&program, &args, limit).await?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(AppError::unreachable(format!(
            "ping {} 失败 ({}): {}",
            destination,
            output.status,
            stderr.trim()
        )))
    }

    async fn inspect_name(&self, target_id: &str, limit: Duration) -> AppResult<String> {
        let args = vec![
            "inspect".to_string(),
            "--format".to_string(),
            "{{.Name}}".to_string(),
            target_id.to_string(),
        ];
        let output = Self::run("docker", &args, limit).await?;
        if !output.status.success() {
            return Err(AppError::discovery(format!(
                "docker inspect {} 失败: {}",
                target_id,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let name = normalize_name(String::from_utf8_lossy(&output.stdout).trim());
        if name.is_empty() {
            return Err(AppError::discovery(format!("容器 {} 没有名称", target_id)));
        }
        Ok(name)
    }

    fn kind(&self) -> &'static str {
        "subprocess"
    }
}
