use std::collections::HashSet;
use std::sync::Mutex;

use crate::models::DedupKey;

/// 单轮探测的认领集合
///
/// `try_claim` 可被多个并发探测共享调用；`reset_cycle` 需要 `&mut self`，
/// 只有本轮所有借用的探测任务结束后才能调用。
#[derive(Debug, Default)]
pub struct CycleState {
    claimed: Mutex<HashSet<DedupKey>>,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 本轮首次认领返回 true，重复认领返回 false
    pub fn try_claim(&self, key: DedupKey) -> bool {
        let mut claimed = self
            .claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        claimed.insert(key)
    }

    /// 清空认领记录，保留已分配的容量
    pub fn reset_cycle(&mut self) {
        self.claimed
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_claim_once_per_cycle() {
        let mut state = CycleState::new();
        let key = DedupKey::new("abc123def456", Some("api"));

        assert!(state.try_claim(key.clone()));
        assert!(!state.try_claim(key.clone()));
        assert!(state.try_claim(DedupKey::new("abc123def456", Some("app"))));
        assert_eq!(state.len(), 2);

        state.reset_cycle();
        assert!(state.is_empty());
        assert!(state.try_claim(key));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut state = CycleState::new();
        state.reset_cycle();
        assert!(state.is_empty());
        state.reset_cycle();
        assert!(state.is_empty());
    }

    #[test]
    fn test_concurrent_claims_single_winner() {
        let state = Arc::new(CycleState::new());
        let wins = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                let wins = wins.clone();
                std::thread::spawn(move || {
                    if state.try_claim(DedupKey::new("abc123def456", Some("api"))) {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert_eq!(state.len(), 1);
    }
}
