//! 执行器抽象
//!
//! [`Actuator`] 描述一个可下发速度命令、可读取位置的旋转电机，由电机控制层实现。
//! [`ActuatorPair`] 把两个机械联动、镜像安装的电机当作一个逻辑关节：
//! 同时读、同时写、同时停。
//!
//! # 符号约定
//!
//! 两个电机相对安装，转向相反。位置读数是设备原生单位（编码器角度），
//! 两侧的符号互为镜像；本层不做任何符号归一化。

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ActuatorFault;
use crate::speed;

/// 速度可控的旋转执行器
///
/// 所有方法都可能返回 [`ActuatorFault`]，调用方负责处理。
pub trait Actuator {
    /// 设备端口号（用于日志与诊断）
    fn port(&self) -> u8;

    /// 下发有符号速度命令（单位见 [`speed`]）
    fn set_velocity(&mut self, velocity: f64) -> Result<(), ActuatorFault>;

    /// 读取当前位置（设备原生单位）
    fn position(&self) -> Result<f64, ActuatorFault>;

    /// 设置反转（同时反转命令方向与编码器读数）
    fn set_reversed(&mut self, reversed: bool) -> Result<(), ActuatorFault>;
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn port(&self) -> u8 {
        (**self).port()
    }

    fn set_velocity(&mut self, velocity: f64) -> Result<(), ActuatorFault> {
        (**self).set_velocity(velocity)
    }

    fn position(&self) -> Result<f64, ActuatorFault> {
        (**self).position()
    }

    fn set_reversed(&mut self, reversed: bool) -> Result<(), ActuatorFault> {
        (**self).set_reversed(reversed)
    }
}

/// 电机在联动对中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorId {
    Left,
    Right,
}

impl ActuatorId {
    /// 所有电机（固定顺序：左、右）
    pub const ALL: [ActuatorId; 2] = [ActuatorId::Left, ActuatorId::Right];

    /// 在 `[left, right]` 数组中的下标
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ActuatorId::Left => 0,
            ActuatorId::Right => 1,
        }
    }
}

impl std::fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActuatorId::Left => write!(f, "left"),
            ActuatorId::Right => write!(f, "right"),
        }
    }
}

/// 电机齿轮组
///
/// 决定满速（127）时的输出转速。intake 机械臂使用红色齿轮组（100 RPM）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gearset {
    /// 100 RPM
    #[default]
    Red,
    /// 200 RPM
    Green,
    /// 600 RPM
    Blue,
}

impl Gearset {
    /// 满速输出转速（RPM）
    pub fn rpm(self) -> f64 {
        match self {
            Gearset::Red => 100.0,
            Gearset::Green => 200.0,
            Gearset::Blue => 600.0,
        }
    }

    /// 每单位速度命令对应的角速度（度/秒）
    pub fn degrees_per_second_per_unit(self) -> f64 {
        self.rpm() * 360.0 / 60.0 / speed::MAX
    }
}

/// 机械联动的电机对
///
/// 左右两个电机作为一个逻辑关节，读写总是成对进行。
#[derive(Debug)]
pub struct ActuatorPair<A: Actuator> {
    left: A,
    right: A,
}

impl<A: Actuator> ActuatorPair<A> {
    /// 创建电机对
    pub fn new(left: A, right: A) -> Self {
        Self { left, right }
    }

    /// 设置两侧的反转标志
    pub fn configure(&mut self, reversed: [bool; 2]) -> Result<(), ActuatorFault> {
        self.left.set_reversed(reversed[0])?;
        self.right.set_reversed(reversed[1])?;
        Ok(())
    }

    /// 获取单个电机
    pub fn get(&self, id: ActuatorId) -> &A {
        match id {
            ActuatorId::Left => &self.left,
            ActuatorId::Right => &self.right,
        }
    }

    /// 获取单个电机（可变）
    pub fn get_mut(&mut self, id: ActuatorId) -> &mut A {
        match id {
            ActuatorId::Left => &mut self.left,
            ActuatorId::Right => &mut self.right,
        }
    }

    /// 两侧端口号 `[left, right]`
    pub fn ports(&self) -> [u8; 2] {
        [self.left.port(), self.right.port()]
    }

    /// 读取两侧位置 `[left, right]`
    pub fn positions(&self) -> Result<[f64; 2], ActuatorFault> {
        Ok([self.left.position()?, self.right.position()?])
    }

    /// 下发两侧速度命令 `[left, right]`（自动钳位到额定范围）
    pub fn command(&mut self, velocities: [f64; 2]) -> Result<(), ActuatorFault> {
        self.left.set_velocity(speed::clamp(velocities[0]))?;
        self.right.set_velocity(speed::clamp(velocities[1]))?;
        Ok(())
    }

    /// 镜像下发：左侧 `+speed`，右侧 `-speed`
    pub fn command_mirrored(&mut self, speed: f64) -> Result<(), ActuatorFault> {
        self.command([speed, -speed])
    }

    /// 两侧同时下发零速度
    ///
    /// 即使一侧失败，另一侧也会尝试停止；返回第一个错误。
    pub fn stop(&mut self) -> Result<(), ActuatorFault> {
        let left = self.left.set_velocity(speed::ZERO);
        let right = self.right.set_velocity(speed::ZERO);

        if let Err(ref e) = left {
            warn!("Failed to stop actuator on port {}: {}", self.left.port(), e);
        }
        if let Err(ref e) = right {
            warn!("Failed to stop actuator on port {}: {}", self.right.port(), e);
        }

        left.and(right)
    }

    /// 拆分为 `(left, right)`
    pub fn into_inner(self) -> (A, A) {
        (self.left, self.right)
    }
}
