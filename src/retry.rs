use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// 有界重试策略
///
/// `multiplier` 为 1.0 时等价于固定间隔重试，大于 1.0 时为指数退避，
/// 单次等待不超过 `max_delay_secs`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// 最大尝试次数（含首次）
    pub max_attempts: u32,
    /// 首次失败后的等待时间（秒）
    pub initial_delay_secs: u64,
    /// 最大等待时间（秒）
    pub max_delay_secs: u64,
    /// 退避倍率
    pub multiplier: f64,
    /// 添加随机抖动
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay_secs: 5,
            max_delay_secs: 60,
            multiplier: 1.0,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// 固定间隔重试
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay_secs: delay.as_secs(),
            max_delay_secs: delay.as_secs(),
            multiplier: 1.0,
            jitter: false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("最大尝试次数必须大于0".to_string());
        }
        if self.multiplier < 1.0 {
            return Err("退避倍率不能小于1.0".to_string());
        }
        if self.max_delay_secs < self.initial_delay_secs {
            return Err("最大等待时间不能小于初始等待时间".to_string());
        }
        Ok(())
    }

    /// 第 `attempt` 次失败后应等待的时间（attempt 从 1 开始，不含抖动）
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1) as i32;
        let secs = self.initial_delay_secs as f64 * self.multiplier.powi(exp);
        let secs = secs.min(self.max_delay_secs as f64);
        Duration::from_secs_f64(secs.max(0.0))
    }

    /// 执行带重试的异步操作，`label` 仅用于日志
    pub async fn execute<F, Fut, T, E>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        info!("{} 在第 {} 次尝试后成功", label, attempt);
                    }
                    return Ok(result);
                }
                Err(e) => {
                    if attempt >= self.max_attempts {
                        error!(
                            "{} 达到最大尝试次数 {}，最终失败: {}",
                            label, self.max_attempts, e
                        );
                        return Err(e);
                    }

                    let delay = self.with_jitter(self.delay_for(attempt));
                    warn!(
                        "{} 第 {}/{} 次尝试失败: {}，{:?}后重试",
                        label, attempt, self.max_attempts, e, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn with_jitter(&self, base: Duration) -> Duration {
        if !self.jitter {
            return base;
        }
        // 10% 抖动
        let range = base.as_secs_f64() * 0.1;
        base + Duration::from_secs_f64(rand::random::<f64>() * range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_fixed_and_exponential() {
        let fixed = RetryPolicy::fixed(10, Duration::from_secs(5));
        assert_eq!(fixed.delay_for(1), Duration::from_secs(5));
        assert_eq!(fixed.delay_for(7), Duration::from_secs(5));

        let exp = RetryPolicy {
            max_attempts: 5,
            initial_delay_secs: 1,
            max_delay_secs: 6,
            multiplier: 2.0,
            jitter: false,
        };
        assert_eq!(exp.delay_for(1), Duration::from_secs(1));
        assert_eq!(exp.delay_for(2), Duration::from_secs(2));
        assert_eq!(exp.delay_for(3), Duration::from_secs(4));
        assert_eq!(exp.delay_for(4), Duration::from_secs(6));
    }

    #[test]
    fn test_validate() {
        assert!(RetryPolicy::default().validate().is_ok());
        let mut policy = RetryPolicy::default();
        policy.max_attempts = 0;
        assert!(policy.validate().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_succeeds_after_failures() {
        let policy = RetryPolicy::fixed(3, Duration::from_secs(5));
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result: Result<u32, String> = policy
            .execute("测试操作", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 { Err(format!("失败 {}", n)) } else { Ok(n) }
            })
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_gives_up_after_max_attempts() {
        let policy = RetryPolicy::fixed(2, Duration::from_secs(1));
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result: Result<(), String> = policy
            .execute("测试操作", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("连接被拒绝".to_string())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
