//! 控制层模块
//!
//! 在 [`intake_driver`] 之上实现 intake 机械臂的同步位置控制：
//! - [`PositionTracker`]：校准得到的 MIN / MAX 边界
//! - [`EasingProfile`]：偏差 → 速度的分段减速曲线
//! - [`MotionController`]：限时、带容差判定的双电机同步运动
//! - [`Calibrator`]：启动校准流程
//! - [`IntakeArm`]：模式门控（自动运动 / 手动接管）与输入处理
//! - [`StatusBoard`]：供显示层读取的无锁状态快照
//! - [`IntakeConfig`]：TOML 配置
//!
//! # Feature Flags
//!
//! - `mock`：启用 `SimSettings::to_sim_config` 并透传 `intake-driver/mock`
//!
//! # 示例（需要 `mock` feature）
//!
//! ```rust,ignore
//! use intake_control::{Direction, IntakeArm, IntakeConfig};
//! use intake_driver::mock::{SimConfig, SimRig};
//!
//! let config = IntakeConfig::default();
//! let rig = SimRig::new(config.sim.to_sim_config(&config.pair));
//! let mut arm = IntakeArm::new(rig.pair(), rig.clock(), &config)?;
//!
//! arm.calibrate()?;
//! let report = arm.request(Direction::Open)?;
//! println!("open: {}", report.outcome);
//! ```

mod calibration;
mod config;
mod controller;
mod easing;
mod error;
mod input;
mod status;
mod strategy;
mod supervisor;
mod tracker;

pub use calibration::{CalibrationConfig, CalibrationReport, Calibrator};
pub use config::{IntakeConfig, MoveSettings, PairSettings, SimSettings};
pub use controller::{ControllerConfig, MotionController, MotionReport, MotionRequest, Outcome};
pub use easing::{EasingBand, EasingProfile};
pub use error::{ConfigError, ControlError};
pub use input::{Direction, EdgeTrigger, OverrideInput};
pub use status::{ArmStatus, StatusBoard};
pub use strategy::{MotionStrategy, TimePhasedSchedule};
pub use supervisor::IntakeArm;
pub use tracker::{Bounds, CalibratedBounds, PositionTracker, Target, within_tolerance};
