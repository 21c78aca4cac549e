//! 机械臂模式定义
//!
//! 同一对电机在任意时刻只能由一个控制流驱动：自动运动（校准 / 开 / 合）
//! 或手动接管。模式标志用于门控，并供显示层读取。

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// 机械臂工作模式
///
/// # 模式说明
///
/// - **Idle**: 空闲，任何控制流都可以接管
/// - **Calibrating**: 正在执行启动校准
/// - **MovingToOpen**: 正在向 MAX（打开）边界运动
/// - **MovingToClose**: 正在向 MIN（闭合）边界运动
/// - **Manual**: 手动接管，自动运动被拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum ArmMode {
    /// 空闲（默认）
    #[default]
    Idle = 0,

    /// 启动校准
    Calibrating = 1,

    /// 向打开边界运动
    MovingToOpen = 2,

    /// 向闭合边界运动
    MovingToClose = 3,

    /// 手动接管
    Manual = 4,
}

impl ArmMode {
    /// 从 u8 转换
    ///
    /// 如果值无效，返回 Idle 模式。
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Calibrating,
            2 => Self::MovingToOpen,
            3 => Self::MovingToClose,
            4 => Self::Manual,
            _ => Self::Idle, // 无效值默认为 Idle
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 是否为空闲
    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }

    /// 是否有自动控制流在驱动电机
    pub fn is_automatic(self) -> bool {
        matches!(self, Self::Calibrating | Self::MovingToOpen | Self::MovingToClose)
    }

    /// 是否为手动接管
    pub fn is_manual(self) -> bool {
        self == Self::Manual
    }
}

impl std::fmt::Display for ArmMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Calibrating => "calibrating",
            Self::MovingToOpen => "moving-to-open",
            Self::MovingToClose => "moving-to-close",
            Self::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// 机械臂模式（原子版本，用于线程间共享）
///
/// # 使用场景
///
/// - 控制线程通过 `compare_exchange()` 从 Idle 抢占模式
/// - 显示线程通过 `get()` 读取当前模式
///
/// # 示例
///
/// ```rust
/// use intake_driver::mode::{ArmMode, AtomicArmMode};
/// use std::sync::atomic::Ordering;
///
/// let mode = AtomicArmMode::new(ArmMode::Idle);
///
/// // 抢占：只有空闲时才能进入自动运动
/// assert!(mode.compare_exchange(
///     ArmMode::Idle,
///     ArmMode::MovingToOpen,
///     Ordering::AcqRel,
///     Ordering::Acquire,
/// ));
/// assert_eq!(mode.get(Ordering::Acquire), ArmMode::MovingToOpen);
/// ```
#[derive(Debug)]
pub struct AtomicArmMode {
    inner: AtomicU8,
}

impl AtomicArmMode {
    /// 创建新的原子模式
    pub fn new(mode: ArmMode) -> Self {
        Self {
            inner: AtomicU8::new(mode.as_u8()),
        }
    }

    /// 获取当前模式
    pub fn get(&self, ordering: Ordering) -> ArmMode {
        ArmMode::from_u8(self.inner.load(ordering))
    }

    /// 设置模式
    pub fn set(&self, mode: ArmMode, ordering: Ordering) {
        self.inner.store(mode.as_u8(), ordering);
    }

    /// 比较并交换（Compare-and-Swap）
    ///
    /// 如果当前值等于 `current`，则设置为 `new` 并返回 true，否则返回 false
    pub fn compare_exchange(
        &self,
        current: ArmMode,
        new: ArmMode,
        success: Ordering,
        failure: Ordering,
    ) -> bool {
        self.inner
            .compare_exchange(current.as_u8(), new.as_u8(), success, failure)
            .is_ok()
    }
}

impl Default for AtomicArmMode {
    fn default() -> Self {
        Self::new(ArmMode::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_mode_conversions() {
        for mode in [
            ArmMode::Idle,
            ArmMode::Calibrating,
            ArmMode::MovingToOpen,
            ArmMode::MovingToClose,
            ArmMode::Manual,
        ] {
            assert_eq!(ArmMode::from_u8(mode.as_u8()), mode);
        }
        assert_eq!(ArmMode::from_u8(255), ArmMode::Idle); // 无效值
    }

    #[test]
    fn test_predicates() {
        assert!(ArmMode::Idle.is_idle());
        assert!(ArmMode::Calibrating.is_automatic());
        assert!(ArmMode::MovingToClose.is_automatic());
        assert!(!ArmMode::Manual.is_automatic());
        assert!(ArmMode::Manual.is_manual());
    }

    #[test]
    fn test_display() {
        assert_eq!(ArmMode::MovingToOpen.to_string(), "moving-to-open");
        assert_eq!(ArmMode::MovingToClose.to_string(), "moving-to-close");
        assert_eq!(ArmMode::Idle.to_string(), "idle");
    }

    #[test]
    fn test_atomic_arm_mode() {
        let mode = AtomicArmMode::default();
        assert_eq!(mode.get(Ordering::Relaxed), ArmMode::Idle);

        mode.set(ArmMode::Manual, Ordering::Relaxed);
        assert_eq!(mode.get(Ordering::Relaxed), ArmMode::Manual);

        // 手动模式下不能抢占
        assert!(!mode.compare_exchange(
            ArmMode::Idle,
            ArmMode::MovingToOpen,
            Ordering::Relaxed,
            Ordering::Relaxed
        ));
        assert_eq!(mode.get(Ordering::Relaxed), ArmMode::Manual);

        assert!(mode.compare_exchange(
            ArmMode::Manual,
            ArmMode::Idle,
            Ordering::Relaxed,
            Ordering::Relaxed
        ));
        assert_eq!(mode.get(Ordering::Relaxed), ArmMode::Idle);
    }
}
