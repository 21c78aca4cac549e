//! 状态发布
//!
//! 控制循环把模式、边界和最新位置写入 [`StatusBoard`]，显示层随时读取快照。
//! 读写都是无锁的（`ArcSwap`），显示线程不会拖慢控制循环；
//! 发布失败或无人读取都不影响控制。

use arc_swap::ArcSwap;
use intake_driver::ArmMode;
use serde::Serialize;
use std::sync::Arc;

use crate::controller::Outcome;
use crate::tracker::CalibratedBounds;

/// 机械臂状态快照
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArmStatus {
    /// 当前模式
    pub mode: ArmMode,
    /// 校准边界（未校准为 None）
    pub bounds: Option<CalibratedBounds>,
    /// 最近一次读取的位置 `[left, right]`
    pub positions: Option<[f64; 2]>,
    /// 最近一次运动的结果
    pub last_outcome: Option<Outcome>,
    /// 已发布的位置样本数
    pub samples: u64,
}

/// 状态板（无锁快照）
#[derive(Debug, Default)]
pub struct StatusBoard {
    inner: ArcSwap<ArmStatus>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取当前快照
    pub fn snapshot(&self) -> Arc<ArmStatus> {
        self.inner.load_full()
    }

    /// 发布最新位置
    pub fn publish_positions(&self, positions: [f64; 2]) {
        self.inner.rcu(|old| {
            let mut new = ArmStatus::clone(old);
            new.positions = Some(positions);
            new.samples += 1;
            Arc::new(new)
        });
    }

    pub fn set_mode(&self, mode: ArmMode) {
        self.inner.rcu(|old| {
            let mut new = ArmStatus::clone(old);
            new.mode = mode;
            Arc::new(new)
        });
    }

    pub fn set_bounds(&self, bounds: CalibratedBounds) {
        self.inner.rcu(|old| {
            let mut new = ArmStatus::clone(old);
            new.bounds = Some(bounds);
            Arc::new(new)
        });
    }

    pub fn set_outcome(&self, outcome: Outcome) {
        self.inner.rcu(|old| {
            let mut new = ArmStatus::clone(old);
            new.last_outcome = Some(outcome);
            Arc::new(new)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::Bounds;

    #[test]
    fn test_default_snapshot() {
        let board = StatusBoard::new();
        let status = board.snapshot();
        assert_eq!(status.mode, ArmMode::Idle);
        assert!(status.bounds.is_none());
        assert!(status.positions.is_none());
        assert_eq!(status.samples, 0);
    }

    #[test]
    fn test_updates_accumulate() {
        let board = StatusBoard::new();
        board.set_mode(ArmMode::MovingToClose);
        board.publish_positions([1.0, -1.0]);
        board.publish_positions([2.0, -2.0]);
        board.set_bounds(CalibratedBounds::new(Bounds::new(0.0, 90.0), Bounds::new(0.0, -90.0)));
        board.set_outcome(Outcome::Reached);

        let status = board.snapshot();
        assert_eq!(status.mode, ArmMode::MovingToClose);
        assert_eq!(status.positions, Some([2.0, -2.0]));
        assert_eq!(status.samples, 2);
        assert_eq!(status.bounds.unwrap().left.max, 90.0);
        assert_eq!(status.last_outcome, Some(Outcome::Reached));
    }

    #[test]
    fn test_old_snapshot_is_unchanged() {
        let board = StatusBoard::new();
        let before = board.snapshot();
        board.set_mode(ArmMode::Manual);
        assert_eq!(before.mode, ArmMode::Idle);
        assert_eq!(board.snapshot().mode, ArmMode::Manual);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let board = StatusBoard::new();
        board.set_mode(ArmMode::MovingToOpen);
        board.publish_positions([12.5, -12.5]);
        board.set_outcome(Outcome::TimedOut);

        let value = serde_json::to_value(&*board.snapshot()).unwrap();
        assert_eq!(value["mode"], "moving-to-open");
        assert_eq!(value["positions"], serde_json::json!([12.5, -12.5]));
        assert_eq!(value["last_outcome"], "timed_out");
        assert_eq!(value["bounds"], serde_json::Value::Null);
        assert_eq!(value["samples"], 1);
    }

    #[test]
    fn test_shared_across_threads() {
        let board = Arc::new(StatusBoard::new());
        let writer = {
            let board = board.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    board.publish_positions([i as f64, -(i as f64)]);
                }
            })
        };
        writer.join().unwrap();
        assert_eq!(board.snapshot().samples, 100);
    }
}
