use fleetprobe::{
    config::{Config, TransportKind},
    error::AppResult,
    services::{
        AgentIdentity, DockerDiscovery, NativeTransport, ProbeExecutor, ProbeOrchestrator,
        ProbeTransport, ResultReporter, SubprocessTransport,
    },
    signal::shutdown_signal,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> AppResult<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetprobe=debug,fleetprobe_agent=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load(CONFIG_PATH).inspect_err(|e| {
        tracing::error!("加载配置失败: {}", e);
    })?;
    let agent = config.agent;

    // 无法确定自身身份时任何结果都无法归属，直接退出
    let identity = AgentIdentity::from_env().inspect_err(|e| {
        tracing::error!("{}", e);
    })?;
    tracing::info!(
        agent = %identity,
        network = %agent.network,
        collector = %agent.collector_url,
        transport = ?agent.transport,
        services = ?agent.services,
        "探测代理启动"
    );

    let transport: Arc<dyn ProbeTransport> = match agent.transport {
        TransportKind::Native => Arc::new(NativeTransport::new(
            agent.tcp_port,
            agent.docker_socket.clone(),
        )),
        TransportKind::Subprocess => Arc::new(SubprocessTransport::new(
            agent.exec_in_self.then(|| identity.clone()),
        )),
    };

    let executor = ProbeExecutor::new(
        transport,
        identity,
        agent.probe_timeout(),
        agent.inspect_timeout(),
    )
    .with_name_resolution(agent.resolve_names);
    let discovery = Arc::new(DockerDiscovery::new(
        agent.docker_socket.clone(),
        agent.discovery_timeout(),
    ));
    let reporter = Arc::new(ResultReporter::new(
        agent.collector_url.clone(),
        agent.report_timeout(),
    )?);

    ProbeOrchestrator::new(
        discovery,
        executor,
        reporter,
        agent.network.clone(),
        agent.services.clone(),
        agent.interval(),
        agent.max_concurrent_probes,
    )
    .run_until(shutdown_signal())
    .await;

    Ok(())
}
