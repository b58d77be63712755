use futures::{StreamExt, stream};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::{
    models::{DedupKey, Target},
    services::{
        dedup::CycleState, discovery::TargetDiscovery, executor::ProbeExecutor,
        reporter::OutcomeReporter,
    },
};

/// 单轮探测统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub discovery_failed: bool,
    pub targets: usize,
    pub claimed: usize,
    pub skipped: usize,
    pub up: usize,
    pub down: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
}

enum JobResult {
    Skipped,
    Probed { up: bool, delivered: bool },
}

/// 探测编排循环：发现 → 去重 → 探测 → 上报 → 重置 → 休眠
pub struct ProbeOrchestrator {
    discovery: Arc<dyn TargetDiscovery>,
    executor: ProbeExecutor,
    reporter: Arc<dyn OutcomeReporter>,
    network: String,
    services: Vec<String>,
    interval: Duration,
    max_concurrency: usize,
    state: CycleState,
}

impl ProbeOrchestrator {
    pub fn new(
        discovery: Arc<dyn TargetDiscovery>,
        executor: ProbeExecutor,
        reporter: Arc<dyn OutcomeReporter>,
        network: impl Into<String>,
        services: Vec<String>,
        interval: Duration,
        max_concurrency: usize,
    ) -> Self {
        Self {
            discovery,
            executor,
            reporter,
            network: network.into(),
            services,
            interval,
            max_concurrency: max_concurrency.max(1),
            state: CycleState::new(),
        }
    }

    /// 运行直到 `shutdown` 完成；只在两轮之间响应停止，进行中的探测会自然结束
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            network = %self.network,
            agent = %self.executor.identity(),
            interval_secs = self.interval.as_secs(),
            "探测编排循环启动"
        );

        loop {
            let cycle_id = Uuid::new_v4();
            let report = self
                .run_cycle()
                .instrument(info_span!("cycle", %cycle_id))
                .await;
            info!(
                %cycle_id,
                targets = report.targets,
                claimed = report.claimed,
                skipped = report.skipped,
                up = report.up,
                down = report.down,
                delivered = report.delivered,
                failed_deliveries = report.failed_deliveries,
                "本轮探测完成，{}秒后开始下一轮",
                self.interval.as_secs()
            );

            tokio::select! {
                _ = &mut shutdown => {
                    info!("收到停止信号，探测编排循环退出");
                    break;
                }
                _ = sleep(self.interval) => {}
            }
        }
    }

    /// 执行一轮完整的探测
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        let targets = match self.discovery.discover(&self.network).await {
            Ok(targets) => targets,
            Err(e) => {
                warn!(network = %self.network, error = %e, "容器发现失败，跳过本轮探测");
                report.discovery_failed = true;
                Vec::new()
            }
        };
        report.targets = targets.len();

        let jobs = plan(&targets, &self.services);
        let state = &self.state;
        let executor = &self.executor;
        let reporter = &self.reporter;

        let results: Vec<JobResult> = stream::iter(jobs)
            .map(|(target, service)| async move {
                if !state.try_claim(DedupKey::new(&target.id, service)) {
                    return JobResult::Skipped;
                }

                let outcome = executor.probe(target, service).await;
                let delivered = match reporter.report(&outcome).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(
                            target_id = %outcome.target_id,
                            service = ?outcome.service,
                            error = %e,
                            "探测结果投递失败，已丢弃"
                        );
                        false
                    }
                };
                JobResult::Probed {
                    up: outcome.is_up(),
                    delivered,
                }
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        for result in results {
            match result {
                JobResult::Skipped => report.skipped += 1,
                JobResult::Probed { up, delivered } => {
                    report.claimed += 1;
                    if up {
                        report.up += 1;
                    } else {
                        report.down += 1;
                    }
                    if delivered {
                        report.delivered += 1;
                    } else {
                        report.failed_deliveries += 1;
                    }
                }
            }
        }

        self.state.reset_cycle();
        report
    }
}

/// 目标与服务列表的笛卡尔积；服务列表为空时只探测容器本身
fn plan<'a>(
    targets: &'a [Target],
    services: &'a [String],
) -> Vec<(&'a Target, Option<&'a str>)> {
    targets
        .iter()
        .flat_map(|target| {
            let services: Vec<Option<&'a str>> = if services.is_empty() {
                vec![None]
            } else {
                services.iter().map(|s| Some(s.as_str())).collect()
            };
            services.into_iter().map(move |service| (target, service))
        })
        .collect()
}
