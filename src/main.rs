use fleetprobe::{
    config::Config, database::Database, error::AppResult, handlers::AppState, routes::create_app,
    signal::shutdown_signal,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> AppResult<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetprobe=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置（不存在时生成默认配置文件）
    let config = Config::load_or_init(CONFIG_PATH)?;

    tracing::info!("服务器配置: {}", config.server_addr());

    // 数据库首次启动需要时间初始化，按重试策略等待；最终失败时以无数据库模式启动
    let database = match Database::connect_with_retry(&config.database, &config.retry).await {
        Ok(db) => match db.ensure_schema().await {
            Ok(()) => Some(db),
            Err(e) => {
                tracing::error!("创建数据表失败: {}", e);
                return Err(e);
            }
        },
        Err(e) => {
            tracing::warn!("数据库连接失败，服务将在无数据库模式下启动: {}", e);
            None
        }
    };

    let app_state = AppState {
        database: database.clone(),
    };
    let app = create_app(app_state);

    // 启动服务器
    let listener = tokio::net::TcpListener::bind(&config.server_addr()).await?;
    tracing::info!("🚀 收集端启动成功，监听地址: {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("收到停止信号，正在关闭服务器");
        })
        .await?;

    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}
