//! Position Tracker - 校准边界
//!
//! 保存每个电机在 MIN（闭合）和 MAX（打开）两个端点的编码器读数。
//! 校准前所有查询都会返回 [`ControlError::Uncalibrated`]，
//! 运动控制器据此拒绝在未知行程上运动。
//!
//! MIN / MAX 只是标签：两侧电机镜像安装，对右侧来说 MAX 的读数可能小于 MIN。
//! 因此任何比较都基于"到目标边界的距离"，从不假设 `min <= max`。

use intake_driver::ActuatorId;
use serde::{Deserialize, Serialize};

use crate::error::ControlError;

/// 运动目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// 闭合位置（校准起点）
    #[serde(alias = "closed")]
    Min,
    /// 打开位置（校准终点）
    #[serde(alias = "open")]
    Max,
}

impl Target {
    /// 另一个边界
    pub fn opposite(self) -> Self {
        match self {
            Target::Min => Target::Max,
            Target::Max => Target::Min,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Min => write!(f, "min"),
            Target::Max => write!(f, "max"),
        }
    }
}

/// 单个电机的边界读数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 取目标边界
    pub fn get(&self, target: Target) -> f64 {
        match target {
            Target::Min => self.min,
            Target::Max => self.max,
        }
    }

    /// 行程跨度（绝对值）
    pub fn span(&self) -> f64 {
        (self.max - self.min).abs()
    }
}

/// 两侧电机的校准结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedBounds {
    pub left: Bounds,
    pub right: Bounds,
}

impl CalibratedBounds {
    pub fn new(left: Bounds, right: Bounds) -> Self {
        Self { left, right }
    }

    /// 单个电机的边界
    pub fn get(&self, id: ActuatorId) -> Bounds {
        match id {
            ActuatorId::Left => self.left,
            ActuatorId::Right => self.right,
        }
    }

    /// 两侧的目标读数 `[left, right]`
    pub fn targets(&self, target: Target) -> [f64; 2] {
        [self.left.get(target), self.right.get(target)]
    }

    /// 两侧到目标的绝对距离 `[left, right]`
    pub fn distances(&self, positions: [f64; 2], target: Target) -> [f64; 2] {
        let targets = self.targets(target);
        [
            (positions[0] - targets[0]).abs(),
            (positions[1] - targets[1]).abs(),
        ]
    }

    /// 两侧是否都在目标的容差范围内
    pub fn all_within(&self, positions: [f64; 2], target: Target, tolerance: f64) -> bool {
        let targets = self.targets(target);
        within_tolerance(positions[0], targets[0], tolerance)
            && within_tolerance(positions[1], targets[1], tolerance)
    }
}

/// 范围检查：`|position - bound| <= tolerance`
///
/// NaN 读数永远不在范围内。
#[inline]
pub fn within_tolerance(position: f64, bound: f64, tolerance: f64) -> bool {
    (position - bound).abs() <= tolerance
}

/// 位置跟踪器
///
/// 由上层（[`IntakeArm`](crate::IntakeArm)）持有，以引用传给控制器。
/// 只有校准流程会写入。
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    bounds: Option<CalibratedBounds>,
}

impl PositionTracker {
    /// 创建未校准的跟踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 用已知边界创建（例如恢复上一次的校准结果）
    pub fn with_bounds(bounds: CalibratedBounds) -> Self {
        Self {
            bounds: Some(bounds),
        }
    }

    /// 是否已校准
    pub fn is_calibrated(&self) -> bool {
        self.bounds.is_some()
    }

    /// 两侧边界
    pub fn calibrated(&self) -> Result<&CalibratedBounds, ControlError> {
        self.bounds.as_ref().ok_or(ControlError::Uncalibrated)
    }

    /// 单个电机的边界
    pub fn bounds_for(&self, id: ActuatorId) -> Result<Bounds, ControlError> {
        self.calibrated().map(|bounds| bounds.get(id))
    }

    /// 写入校准结果（覆盖旧值）
    pub(crate) fn record(&mut self, bounds: CalibratedBounds) {
        self.bounds = Some(bounds);
    }
}
