//! 时钟抽象
//!
//! 控制循环只通过 [`Clock`] 读取时间和休眠，因此测试可以注入虚拟时钟，
//! 不依赖真实硬件，也不需要真实等待。
//!
//! # 要求
//!
//! - `now()` 必须单调，运行期间不得回绕或重置
//! - `sleep()` 返回时 `now()` 至少前进了请求的时长

use spin_sleep::SpinSleeper;
use std::time::{Duration, Instant};

/// 单调时钟
pub trait Clock {
    /// 自时钟纪元以来经过的时间
    fn now(&self) -> Duration;

    /// 休眠指定时长
    fn sleep(&self, duration: Duration);

    /// 自 `since` 以来经过的时间（饱和减法）
    fn elapsed_since(&self, since: Duration) -> Duration {
        self.now().saturating_sub(since)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// 基于 `Instant` 的系统单调时钟
///
/// 使用 `spin_sleep` 实现低抖动延时（控制周期通常只有 10~20ms，
/// 操作系统默认的 sleep 粒度会造成明显的周期抖动）。
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    epoch: Instant,
    sleeper: SpinSleeper,
}

impl MonotonicClock {
    /// 创建时钟，纪元为当前时刻
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            sleeper: SpinSleeper::default(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        self.sleeper.sleep(duration);
    }
}
