//! 驱动层模块
//!
//! 本 crate 提供 intake 机械臂（左右两个镜像安装的旋转电机）的硬件抽象，包括：
//! - [`Actuator`] trait：速度可控、位置可读的旋转执行器（由电机控制层提供）
//! - [`ActuatorPair`]：把两个机械联动的电机当作一个逻辑关节读写
//! - [`Clock`] trait 与 [`MonotonicClock`]：单调时钟 + 低抖动延时
//! - [`ArmMode`] / [`AtomicArmMode`]：自动运动与手动接管之间的模式标志
//! - [`speed`]：速度档位常量
//!
//! # Feature Flags
//!
//! - `mock`：启用 [`mock`] 模块（确定性的模拟台架，无需硬件即可测试）
//!
//! # 使用场景
//!
//! 控制算法位于 `intake-control`，本 crate 只负责"怎样发命令、怎样读位置"。

pub mod actuator;
pub mod clock;
mod error;
pub mod mode;
pub mod speed;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use actuator::{Actuator, ActuatorId, ActuatorPair, Gearset};
pub use clock::{Clock, MonotonicClock};
pub use error::ActuatorFault;
pub use mode::{ArmMode, AtomicArmMode};
