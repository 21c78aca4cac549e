//! 驱动层错误类型定义

use thiserror::Error;

/// 执行器故障
///
/// 由电机控制层上报，控制层原样向上传播（不做转换）。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActuatorFault {
    /// 电机端口断开（线缆松动、端口损坏）
    #[error("Actuator on port {port} disconnected")]
    Disconnected { port: u8 },

    /// 电机过温保护
    #[error("Actuator on port {port} over temperature")]
    OverTemperature { port: u8 },

    /// 电机过流（堵转）
    #[error("Actuator on port {port} over current")]
    OverCurrent { port: u8 },

    /// 其他 IO 错误
    #[error("Actuator IO error: {0}")]
    Io(String),
}

impl ActuatorFault {
    /// 故障所在端口（`Io` 错误没有端口信息）
    pub fn port(&self) -> Option<u8> {
        match self {
            Self::Disconnected { port }
            | Self::OverTemperature { port }
            | Self::OverCurrent { port } => Some(*port),
            Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ActuatorFault;

    #[test]
    fn test_actuator_fault_display() {
        let fault = ActuatorFault::Disconnected { port: 9 };
        assert_eq!(format!("{}", fault), "Actuator on port 9 disconnected");

        let fault = ActuatorFault::OverTemperature { port: 10 };
        assert!(format!("{}", fault).contains("over temperature"));

        let fault = ActuatorFault::OverCurrent { port: 10 };
        assert!(format!("{}", fault).contains("over current"));

        let fault = ActuatorFault::Io("bus reset".to_string());
        let msg = format!("{}", fault);
        assert!(msg.contains("IO error") && msg.contains("bus reset"));
    }

    #[test]
    fn test_fault_port() {
        assert_eq!(ActuatorFault::Disconnected { port: 9 }.port(), Some(9));
        assert_eq!(ActuatorFault::OverCurrent { port: 10 }.port(), Some(10));
        assert_eq!(ActuatorFault::Io("x".into()).port(), None);
    }
}
