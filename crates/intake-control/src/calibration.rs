//! Calibration Routine - 启动校准
//!
//! 流程：
//! 1. 记录当前位置为 MIN（闭合）
//! 2. 以 `sweep_speed` 镜像向打开方向运动 `sweep_ms` 毫秒（固定时长，不看误差）
//! 3. 记录位置为 MAX（打开）
//! 4. 两侧零速度
//! 5. 写入 [`PositionTracker`]（覆盖旧值）
//! 6. 可选：用 Motion Controller 回到 MIN
//!
//! 不做重试。校准必须在机械臂无阻挡的状态下运行，否则边界就是电机实际停下的位置。
//! 扫动过程中发生故障时不写入边界。

use intake_driver::{Actuator, ActuatorPair, Clock, speed};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::controller::{MotionController, MotionReport, MotionRequest, Outcome};
use crate::error::{ConfigError, ControlError};
use crate::tracker::{Bounds, CalibratedBounds, PositionTracker, Target};

/// 校准配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// 扫动时长（毫秒）
    pub sweep_ms: u64,
    /// 扫动速度（镜像：左 +，右 -）
    pub sweep_speed: f64,
    /// 校准后是否回到 MIN
    pub settle: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            sweep_ms: 1500,
            sweep_speed: speed::QUARTER,
            settle: true,
        }
    }
}

impl CalibrationConfig {
    pub fn sweep_duration(&self) -> Duration {
        Duration::from_millis(self.sweep_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_ms == 0 {
            return Err(ConfigError::Invalid("calibration sweep_ms must be > 0".to_string()));
        }
        if !self.sweep_speed.is_finite() || self.sweep_speed == 0.0 || self.sweep_speed.abs() > speed::MAX {
            return Err(ConfigError::Invalid(format!(
                "calibration sweep_speed must be non-zero and within ±{}, got {}",
                speed::MAX,
                self.sweep_speed
            )));
        }
        Ok(())
    }
}

/// 校准报告
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationReport {
    /// 写入跟踪器的边界
    pub bounds: CalibratedBounds,
    /// 回到 MIN 的结果（未启用时为 None）
    pub settle: Option<MotionReport>,
}

impl CalibrationReport {
    /// 回位是否成功（未启用回位视为成功）
    pub fn settled(&self) -> bool {
        self.settle.is_none_or(|report| report.outcome == Outcome::Reached)
    }
}

/// 校准流程
#[derive(Debug, Clone)]
pub struct Calibrator {
    config: CalibrationConfig,
    settle_request: MotionRequest,
}

impl Calibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            settle_request: MotionRequest::close(),
        }
    }

    /// 设置回位使用的截止时间与容差（目标固定为 MIN）
    pub fn with_settle_request(mut self, request: MotionRequest) -> Self {
        self.settle_request = MotionRequest {
            target: Target::Min,
            ..request
        };
        self
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// 执行校准
    ///
    /// 成功时边界已写入 `tracker`。回位超时只记录在报告中，不视为错误。
    pub fn run<A: Actuator, C: Clock>(
        &self,
        pair: &mut ActuatorPair<A>,
        tracker: &mut PositionTracker,
        controller: &MotionController<C>,
    ) -> Result<CalibrationReport, ControlError> {
        info!(
            "Calibrating: sweep {} ms at speed {}",
            self.config.sweep_ms, self.config.sweep_speed
        );

        let swept = self.sweep(pair, controller);
        let stopped = pair.stop();

        let (min, max) = match swept {
            Ok(positions) => {
                stopped?;
                positions
            },
            Err(e) => {
                error!("Calibration sweep aborted, bounds unchanged: {}", e);
                return Err(e);
            },
        };

        let bounds = CalibratedBounds::new(Bounds::new(min[0], max[0]), Bounds::new(min[1], max[1]));
        tracker.record(bounds);
        if let Some(status) = controller.status() {
            status.set_bounds(bounds);
        }
        info!(
            "Calibrated bounds: left {:.1}..{:.1}, right {:.1}..{:.1}",
            bounds.left.min, bounds.left.max, bounds.right.min, bounds.right.max
        );

        if bounds.left.span() < self.settle_request.tolerance
            || bounds.right.span() < self.settle_request.tolerance
        {
            warn!("Calibrated span is within tolerance, the arm may be obstructed");
        }

        let settle = if self.config.settle {
            let report = controller.move_to_bound(pair, tracker, self.settle_request)?;
            if report.outcome == Outcome::TimedOut {
                warn!("Post-calibration settle did not reach MIN");
            }
            Some(report)
        } else {
            None
        };

        Ok(CalibrationReport { bounds, settle })
    }

    /// 记录 MIN，扫动，记录 MAX
    fn sweep<A: Actuator, C: Clock>(
        &self,
        pair: &mut ActuatorPair<A>,
        controller: &MotionController<C>,
    ) -> Result<([f64; 2], [f64; 2]), ControlError> {
        let clock = controller.clock();
        let tick = controller.config().tick();
        let min = pair.positions()?;
        debug!("Recorded MIN: {:?}", min);

        let start = clock.now();
        let end = start.saturating_add(self.config.sweep_duration());
        loop {
            let now = clock.now();
            if now >= end {
                break;
            }
            pair.command_mirrored(self.config.sweep_speed)?;
            clock.sleep(tick.min(end - now));
            if let Some(status) = controller.status() {
                status.publish_positions(pair.positions()?);
            }
        }

        let max = pair.positions()?;
        debug!("Recorded MAX: {:?}", max);
        Ok((min, max))
    }
}
