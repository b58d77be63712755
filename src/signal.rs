use std::future::Future;

/// 等待 Ctrl-C 或 SIGTERM
///
/// 任一信号注册失败时只记录警告，该分支不再触发停止
pub async fn shutdown_signal() {
    let ctrl_c = wait_for("Ctrl-C", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = wait_for("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("收到 Ctrl-C"),
        _ = terminate => tracing::info!("收到 SIGTERM"),
    }
}

async fn wait_for<F, E>(name: &str, signal: F)
where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    if let Err(e) = signal.await {
        tracing::warn!("注册{}处理失败: {}", name, e);
        std::future::pending::<()>().await;
    }
}
