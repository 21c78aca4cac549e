//! 运动策略
//!
//! 开合两个方向各自选择一种速度策略：
//!
//! - [`MotionStrategy::TimePhased`]：按时间分段。前 `kick_ms` 毫秒以 `kick_speed`
//!   朝目标运动，之后以 `settle_speed` 运动（默认反向，抵消惯性过冲）。
//!   方向在运动开始时确定，之后不变。
//! - [`MotionStrategy::OffsetEased`]：按偏差查 [`EasingProfile`]，每个 tick
//!   重新判断方向。
//!
//! 速度均以"朝向目标"为正，由控制器乘以每个电机的方向符号。

use intake_driver::speed;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::easing::EasingProfile;
use crate::error::ConfigError;

/// 时间分段速度表
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimePhasedSchedule {
    /// 起步段时长（毫秒）
    pub kick_ms: u64,
    /// 起步段速度（朝向目标为正）
    pub kick_speed: f64,
    /// 起步段之后的速度（朝向目标为正）
    pub settle_speed: f64,
}

impl Default for TimePhasedSchedule {
    fn default() -> Self {
        Self {
            kick_ms: 500,
            kick_speed: speed::QUARTER,
            settle_speed: -speed::QUARTER,
        }
    }
}

impl TimePhasedSchedule {
    pub fn kick_duration(&self) -> Duration {
        Duration::from_millis(self.kick_ms)
    }

    /// 运动开始后 `elapsed` 时刻的速度
    pub fn speed(&self, elapsed: Duration) -> f64 {
        if elapsed < self.kick_duration() {
            self.kick_speed
        } else {
            self.settle_speed
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("kick_speed", self.kick_speed), ("settle_speed", self.settle_speed)] {
            if !value.is_finite() || value.abs() > speed::MAX {
                return Err(ConfigError::Invalid(format!(
                    "time-phased {} must be within ±{}, got {}",
                    name,
                    speed::MAX,
                    value
                )));
            }
        }
        Ok(())
    }
}

/// 单个方向的运动策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionStrategy {
    /// 按时间分段
    TimePhased(TimePhasedSchedule),
    /// 按偏差减速
    OffsetEased(EasingProfile),
}

impl MotionStrategy {
    /// 默认打开策略
    pub fn default_open() -> Self {
        MotionStrategy::TimePhased(TimePhasedSchedule::default())
    }

    /// 默认闭合策略
    pub fn default_close() -> Self {
        MotionStrategy::OffsetEased(EasingProfile::default())
    }

    /// 策略名（用于日志）
    pub fn name(&self) -> &'static str {
        match self {
            MotionStrategy::TimePhased(_) => "time_phased",
            MotionStrategy::OffsetEased(_) => "offset_eased",
        }
    }

    /// 是否每个 tick 重新判断方向
    pub fn retargets(&self) -> bool {
        matches!(self, MotionStrategy::OffsetEased(_))
    }

    /// 朝向目标的速度
    ///
    /// `elapsed` 为本次运动已用时间，`offset` 为两侧到目标的平均距离。
    pub fn speed(&self, elapsed: Duration, offset: f64) -> f64 {
        match self {
            MotionStrategy::TimePhased(schedule) => schedule.speed(elapsed),
            MotionStrategy::OffsetEased(profile) => profile.speed(offset),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            MotionStrategy::TimePhased(schedule) => schedule.validate(),
            MotionStrategy::OffsetEased(profile) => profile.validate(),
        }
    }
}
