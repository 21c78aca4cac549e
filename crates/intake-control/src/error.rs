//! 控制层错误类型定义
//!
//! 超时（`TimedOut`）不是错误：它是 [`Outcome`](crate::Outcome) 的一种，
//! 电机已安全停止，调用方可以重试或接受当前位置。

use intake_driver::{ActuatorFault, ArmMode};
use thiserror::Error;

/// 控制错误
#[derive(Debug, Error)]
pub enum ControlError {
    /// 位置跟踪器尚未校准，拒绝运动
    #[error("Position tracker is not calibrated, run calibration first")]
    Uncalibrated,

    /// 请求参数无效
    #[error("Invalid motion request: {0}")]
    InvalidRequest(String),

    /// 另一个控制流正在占用电机
    #[error("Actuators are owned by another controller (current mode: {current})")]
    ModeConflict { current: ArmMode },

    /// 执行器故障（原样透传）
    #[error(transparent)]
    Actuator(#[from] ActuatorFault),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读写配置文件失败
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 配置值无效
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_error_display() {
        let msg = format!("{}", ControlError::Uncalibrated);
        assert!(msg.contains("not calibrated"));

        let msg = format!("{}", ControlError::InvalidRequest("tolerance".to_string()));
        assert!(msg.contains("Invalid motion request") && msg.contains("tolerance"));

        let msg = format!(
            "{}",
            ControlError::ModeConflict {
                current: ArmMode::Manual
            }
        );
        assert!(msg.contains("manual"));
    }

    #[test]
    fn test_actuator_fault_is_transparent() {
        let fault = ActuatorFault::Disconnected { port: 9 };
        let err: ControlError = fault.clone().into();
        assert_eq!(format!("{}", err), format!("{}", fault));
        match err {
            ControlError::Actuator(inner) => assert_eq!(inner, fault),
            _ => panic!("Expected Actuator variant"),
        }
    }

    #[test]
    fn test_config_error_from_toml() {
        let parse_err = toml::from_str::<toml::Table>("not = = valid").unwrap_err();
        let err: ConfigError = parse_err.into();
        assert!(format!("{}", err).contains("Failed to parse config"));
    }
}
