//! # 配置
//!
//! intake 机械臂的全部可调参数，TOML 格式，所有段落都有默认值：
//!
//! ```toml
//! [pair]
//! left_port = 9
//! right_port = 10
//!
//! [controller]
//! tick_ms = 20
//!
//! [controller.open_strategy]
//! kind = "time_phased"
//! kick_ms = 500
//!
//! [close_move]
//! deadline_ms = 2000
//! tolerance = 50.0
//! ```

use intake_driver::Gearset;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::calibration::CalibrationConfig;
use crate::controller::{ControllerConfig, MotionRequest};
use crate::error::ConfigError;
use crate::tracker::Target;

/// intake 机械臂配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// 电机对
    pub pair: PairSettings,

    /// 控制器
    pub controller: ControllerConfig,

    /// 打开运动参数
    pub open_move: MoveSettings,

    /// 闭合运动参数
    pub close_move: MoveSettings,

    /// 校准
    pub calibration: CalibrationConfig,

    /// 模拟台架
    pub sim: SimSettings,
}

impl IntakeConfig {
    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 保存配置到文件（自动创建父目录）
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 校验所有段落
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pair.validate()?;
        self.controller.validate()?;
        self.open_move.validate("open_move")?;
        self.close_move.validate("close_move")?;
        self.calibration.validate()?;
        self.sim.validate()?;
        Ok(())
    }

    /// 打开请求
    pub fn open_request(&self) -> MotionRequest {
        self.open_move.request(Target::Max)
    }

    /// 闭合请求
    pub fn close_request(&self) -> MotionRequest {
        self.close_move.request(Target::Min)
    }
}

/// 电机对设置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairSettings {
    pub left_port: u8,
    pub right_port: u8,
    pub left_reversed: bool,
    pub right_reversed: bool,
}

impl Default for PairSettings {
    fn default() -> Self {
        Self {
            left_port: 9,
            right_port: 10,
            left_reversed: false,
            right_reversed: false,
        }
    }
}

impl PairSettings {
    /// 反转标志 `[left, right]`
    pub fn reversed(&self) -> [bool; 2] {
        [self.left_reversed, self.right_reversed]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for port in [self.left_port, self.right_port] {
            if !(1..=21).contains(&port) {
                return Err(ConfigError::Invalid(format!(
                    "actuator port must be in 1..=21, got {}",
                    port
                )));
            }
        }
        if self.left_port == self.right_port {
            return Err(ConfigError::Invalid(format!(
                "left and right actuators share port {}",
                self.left_port
            )));
        }
        Ok(())
    }
}

/// 单个方向的运动参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveSettings {
    /// 截止时间（毫秒）
    pub deadline_ms: u64,
    /// 到位容差
    pub tolerance: f64,
}

impl Default for MoveSettings {
    fn default() -> Self {
        Self {
            deadline_ms: MotionRequest::DEFAULT_DEADLINE.as_millis() as u64,
            tolerance: MotionRequest::DEFAULT_TOLERANCE,
        }
    }
}

impl MoveSettings {
    pub fn request(&self, target: Target) -> MotionRequest {
        MotionRequest::new(target, Duration::from_millis(self.deadline_ms), self.tolerance)
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{}.tolerance must be finite and >= 0, got {}",
                section, self.tolerance
            )));
        }
        Ok(())
    }
}

/// 模拟台架设置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// 齿轮组（决定速度 → 角速度的换算）
    pub gearset: Gearset,
    /// 机械行程（度）
    pub span: f64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            gearset: Gearset::Red,
            span: 120.0,
        }
    }
}

impl SimSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.span.is_finite() || self.span <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "sim.span must be > 0, got {}",
                self.span
            )));
        }
        Ok(())
    }

    /// 构造模拟台架配置（端口取自 `pair`）
    ///
    /// 需要启用 `mock` feature（会同时启用 `intake-driver/mock`）。
    #[cfg(feature = "mock")]
    pub fn to_sim_config(&self, pair: &PairSettings) -> intake_driver::mock::SimConfig {
        let mut config = intake_driver::mock::SimConfig::intake(self.gearset, self.span);
        config.left.port = pair.left_port;
        config.right.port = pair.right_port;
        config
    }
}
