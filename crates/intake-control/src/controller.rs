//! Motion Controller - 限时的双电机同步运动
//!
//! 驱动一对镜像电机朝校准边界（MIN 或 MAX）运动，直到两侧都进入容差
//! （[`Outcome::Reached`]）或超过截止时间（[`Outcome::TimedOut`]）。
//!
//! # 控制循环
//!
//! 每个 tick：
//! 1. 读取两侧位置
//! 2. 两侧都在容差内 → `Reached`；否则已用时间 ≥ 截止时间 → `TimedOut`
//! 3. 按该方向的 [`MotionStrategy`] 计算速度，镜像下发给两侧
//! 4. 休眠到下一个 tick 锚点（不超过截止时间）
//!
//! 无论以何种方式退出（到达、超时、故障），两侧都会收到零速度命令。
//! 一侧先到位时不会单独停下，机械联动的两侧必须一起停。
//!
//! # 示例
//!
//! ```rust,ignore
//! use intake_control::{ControllerConfig, MotionController, MotionRequest, Target};
//! use intake_driver::mock::{SimConfig, SimRig};
//!
//! let rig = SimRig::new(SimConfig::default());
//! let mut pair = rig.pair();
//! let controller = MotionController::new(rig.clock(), ControllerConfig::default());
//!
//! let report = controller.move_to_bound(&mut pair, &tracker, MotionRequest::close())?;
//! println!("{:?} after {:?}", report.outcome, report.elapsed);
//! ```

use intake_driver::{Actuator, ActuatorPair, Clock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::{ConfigError, ControlError};
use crate::status::StatusBoard;
use crate::strategy::MotionStrategy;
use crate::tracker::{CalibratedBounds, PositionTracker, Target};

/// 运动请求
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionRequest {
    /// 目标边界
    pub target: Target,
    /// 截止时间（从开始运动算起）
    pub deadline: Duration,
    /// 到位容差（绝对位置误差）
    pub tolerance: f64,
}

impl MotionRequest {
    /// 默认截止时间
    pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(2000);
    /// 默认容差
    pub const DEFAULT_TOLERANCE: f64 = 50.0;

    pub fn new(target: Target, deadline: Duration, tolerance: f64) -> Self {
        Self {
            target,
            deadline,
            tolerance,
        }
    }

    /// 以默认参数打开（→ MAX）
    pub fn open() -> Self {
        Self::new(Target::Max, Self::DEFAULT_DEADLINE, Self::DEFAULT_TOLERANCE)
    }

    /// 以默认参数闭合（→ MIN）
    pub fn close() -> Self {
        Self::new(Target::Min, Self::DEFAULT_DEADLINE, Self::DEFAULT_TOLERANCE)
    }

    fn validate(&self) -> Result<(), ControlError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ControlError::InvalidRequest(format!(
                "tolerance must be finite and >= 0, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// 运动结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// 两侧都进入容差
    Reached,
    /// 截止时间到达，电机已停止
    TimedOut,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Reached => write!(f, "reached"),
            Outcome::TimedOut => write!(f, "timed out"),
        }
    }
}

/// 运动报告
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionReport {
    pub outcome: Outcome,
    /// 从开始到判定结果的时间
    pub elapsed: Duration,
    /// 下发速度命令的次数
    pub ticks: u32,
    /// 判定结果时的位置 `[left, right]`
    pub final_positions: [f64; 2],
}

impl MotionReport {
    pub fn reached(&self) -> bool {
        self.outcome == Outcome::Reached
    }
}

/// 控制器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// 控制周期（毫秒）
    pub tick_ms: u64,
    /// 打开（→ MAX）策略
    pub open_strategy: MotionStrategy,
    /// 闭合（→ MIN）策略
    pub close_strategy: MotionStrategy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_ms: 20,
            open_strategy: MotionStrategy::default_open(),
            close_strategy: MotionStrategy::default_close(),
        }
    }
}

impl ControllerConfig {
    /// 控制周期（至少 1 毫秒，保证虚拟时钟下循环也会推进）
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// 目标方向对应的策略
    pub fn strategy_for(&self, target: Target) -> &MotionStrategy {
        match target {
            Target::Max => &self.open_strategy,
            Target::Min => &self.close_strategy,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("controller tick_ms must be > 0".to_string()));
        }
        self.open_strategy.validate()?;
        self.close_strategy.validate()?;
        Ok(())
    }
}

/// 目标方向上每侧的默认转向 `[left, right]`
///
/// 电机已精确停在边界上时使用：打开时左正右负，闭合时相反。
fn polarity(target: Target) -> [f64; 2] {
    match target {
        Target::Max => [1.0, -1.0],
        Target::Min => [-1.0, 1.0],
    }
}

/// 每侧朝向各自边界的符号
fn directions(positions: [f64; 2], targets: [f64; 2], target: Target) -> [f64; 2] {
    let fallback = polarity(target);
    let mut dirs = [0.0; 2];
    for i in 0..2 {
        let delta = targets[i] - positions[i];
        dirs[i] = if delta > 0.0 {
            1.0
        } else if delta < 0.0 {
            -1.0
        } else {
            fallback[i]
        };
    }
    dirs
}

/// 运动控制器
///
/// 不持有跨调用的状态：边界来自 [`PositionTracker`]，时间来自注入的 [`Clock`]。
pub struct MotionController<C: Clock> {
    clock: C,
    config: ControllerConfig,
    status: Option<Arc<StatusBoard>>,
}

impl<C: Clock> MotionController<C> {
    pub fn new(clock: C, config: ControllerConfig) -> Self {
        Self {
            clock,
            config,
            status: None,
        }
    }

    /// 附加状态板，每个 tick 发布位置
    pub fn with_status(mut self, status: Arc<StatusBoard>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn status(&self) -> Option<&Arc<StatusBoard>> {
        self.status.as_ref()
    }

    /// 驱动电机对到目标边界
    ///
    /// # 错误
    ///
    /// - [`ControlError::Uncalibrated`]：跟踪器未校准，不下发任何命令
    /// - [`ControlError::InvalidRequest`]：容差无效，不下发任何命令
    /// - [`ControlError::Actuator`]：执行器故障，返回前已尝试停止两侧
    ///
    /// 超时不是错误，见 [`Outcome::TimedOut`]。
    pub fn move_to_bound<A: Actuator>(
        &self,
        pair: &mut ActuatorPair<A>,
        tracker: &PositionTracker,
        request: MotionRequest,
    ) -> Result<MotionReport, ControlError> {
        let bounds = *tracker.calibrated()?;
        request.validate()?;

        let strategy = self.config.strategy_for(request.target);
        info!(
            "Moving to {} (strategy: {}, deadline: {:?}, tolerance: {})",
            request.target,
            strategy.name(),
            request.deadline,
            request.tolerance
        );

        let result = self.drive(pair, &bounds, &request, strategy);

        // 无论结果如何都停止两侧
        let stopped = pair.stop();

        match result {
            Ok(report) => {
                stopped?;
                if let Some(status) = &self.status {
                    status.set_outcome(report.outcome);
                }
                match report.outcome {
                    Outcome::Reached => info!(
                        "Reached {} in {:?} ({} ticks), positions: {:?}",
                        request.target, report.elapsed, report.ticks, report.final_positions
                    ),
                    Outcome::TimedOut => warn!(
                        "Timed out moving to {} after {:?}, positions: {:?}",
                        request.target, report.elapsed, report.final_positions
                    ),
                }
                Ok(report)
            },
            Err(e) => {
                error!("Motion to {} aborted: {}", request.target, e);
                Err(e)
            },
        }
    }

    fn drive<A: Actuator>(
        &self,
        pair: &mut ActuatorPair<A>,
        bounds: &CalibratedBounds,
        request: &MotionRequest,
        strategy: &MotionStrategy,
    ) -> Result<MotionReport, ControlError> {
        let targets = bounds.targets(request.target);
        let tick = self.config.tick();
        let start = self.clock.now();
        // Duration::MAX 表示不限时
        let deadline_at = start.saturating_add(request.deadline);
        let mut next_tick = start;
        let mut ticks = 0u32;
        let mut locked_directions: Option<[f64; 2]> = None;

        loop {
            let positions = pair.positions()?;
            let elapsed = self.clock.elapsed_since(start);

            if let Some(status) = &self.status {
                status.publish_positions(positions);
            }

            if bounds.all_within(positions, request.target, request.tolerance) {
                return Ok(MotionReport {
                    outcome: Outcome::Reached,
                    elapsed,
                    ticks,
                    final_positions: positions,
                });
            }

            if elapsed >= request.deadline {
                return Ok(MotionReport {
                    outcome: Outcome::TimedOut,
                    elapsed,
                    ticks,
                    final_positions: positions,
                });
            }

            let dirs = match locked_directions {
                Some(dirs) if !strategy.retargets() => dirs,
                _ => {
                    let dirs = directions(positions, targets, request.target);
                    locked_directions = Some(dirs);
                    dirs
                },
            };

            let distances = bounds.distances(positions, request.target);
            let offset = (distances[0] + distances[1]) / 2.0;
            let speed = strategy.speed(elapsed, offset);

            pair.command([dirs[0] * speed, dirs[1] * speed])?;
            ticks += 1;

            debug!(
                "tick {}: positions={:?}, offset={:.1}, speed={:.1}",
                ticks, positions, offset, speed
            );

            // 绝对时间锚点，不越过截止时间
            next_tick = next_tick.saturating_add(tick);
            let wake = next_tick.min(deadline_at);
            let now = self.clock.now();
            if wake > now {
                self.clock.sleep(wake - now);
            } else {
                next_tick = now;
            }
        }
    }
}
