//! 模拟台架（Mock 模式）
//!
//! 用于测试和演示的确定性电机对模拟：
//! - 两个电机共享一个虚拟时钟，只有 [`SimClock::sleep`] 会推进时间
//! - 电机位置按 `命令速度 × rate × dt` 积分，并受机械限位约束
//! - 可以冻结电机（模拟堵转）或注入故障
//!
//! # 示例
//!
//! ```rust,ignore
//! use intake_driver::mock::{SimConfig, SimRig};
//! use intake_driver::{ActuatorId, Clock};
//! use std::time::Duration;
//!
//! let rig = SimRig::new(SimConfig::default());
//! let mut pair = rig.pair();
//! let clock = rig.clock();
//!
//! pair.command_mirrored(31.0).unwrap();
//! clock.sleep(Duration::from_millis(100));
//!
//! assert!(rig.position(ActuatorId::Left) > 0.0);
//! assert!(rig.position(ActuatorId::Right) < 0.0);
//! ```

use parking_lot::Mutex;
use spin_sleep::SpinSleeper;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::actuator::{Actuator, ActuatorId, ActuatorPair, Gearset};
use crate::clock::Clock;
use crate::error::ActuatorFault;

/// 单个模拟电机的配置
#[derive(Debug, Clone, PartialEq)]
pub struct SimMotorConfig {
    /// 端口号
    pub port: u8,
    /// 初始位置
    pub start: f64,
    /// 机械限位 `(low, high)`，`None` 表示无限位
    pub travel: Option<(f64, f64)>,
    /// 每单位速度命令对应的位置变化率（单位/秒）
    pub rate: f64,
}

/// 模拟台架配置
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub left: SimMotorConfig,
    pub right: SimMotorConfig,
    /// 为 true 时 `sleep` 同时按真实时间等待（用于演示）
    pub realtime: bool,
    /// 每个电机保留的命令历史条数（超出后丢弃最旧的）
    pub history_limit: usize,
}

impl SimConfig {
    /// 默认命令历史条数
    pub const DEFAULT_HISTORY_LIMIT: usize = 4096;

    /// intake 机械臂：左 9 号、右 10 号端口，镜像安装，行程 `span` 度
    ///
    /// 左侧向正方向打开，右侧向负方向打开。
    pub fn intake(gearset: Gearset, span: f64) -> Self {
        let rate = gearset.degrees_per_second_per_unit();
        Self {
            left: SimMotorConfig {
                port: 9,
                start: 0.0,
                travel: Some((0.0, span)),
                rate,
            },
            right: SimMotorConfig {
                port: 10,
                start: 0.0,
                travel: Some((-span, 0.0)),
                rate,
            },
            realtime: false,
            history_limit: Self::DEFAULT_HISTORY_LIMIT,
        }
    }

    /// 无限位、指定速率的电机对（便于构造测试场景）
    pub fn unbounded(rate: f64) -> Self {
        Self {
            left: SimMotorConfig {
                port: 9,
                start: 0.0,
                travel: None,
                rate,
            },
            right: SimMotorConfig {
                port: 10,
                start: 0.0,
                travel: None,
                rate,
            },
            realtime: false,
            history_limit: Self::DEFAULT_HISTORY_LIMIT,
        }
    }

    /// 设置两侧初始位置
    pub fn with_start(mut self, left: f64, right: f64) -> Self {
        self.left.start = left;
        self.right.start = right;
        self
    }

    /// 启用真实时间节拍
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// 设置命令历史条数
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::intake(Gearset::Red, 100.0)
    }
}

#[derive(Debug)]
struct SimMotor {
    config: SimMotorConfig,
    /// 物理位置（不受 reversed 影响）
    position: f64,
    /// 物理速度命令
    command: f64,
    reversed: bool,
    frozen: bool,
    fault: Option<ActuatorFault>,
    /// 最近一次下发的命令（调用方视角）
    last_command: f64,
    /// 最近 `history_limit` 条命令（调用方视角）
    history: VecDeque<f64>,
    history_limit: usize,
}

impl SimMotor {
    fn new(config: SimMotorConfig, history_limit: usize) -> Self {
        Self {
            position: config.start,
            config,
            command: 0.0,
            reversed: false,
            frozen: false,
            fault: None,
            last_command: 0.0,
            history: VecDeque::new(),
            history_limit,
        }
    }

    fn record(&mut self, velocity: f64) {
        self.last_command = velocity;
        if self.history_limit == 0 {
            return;
        }
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(velocity);
    }

    fn advance(&mut self, dt: Duration) {
        if self.frozen {
            return;
        }
        self.position += self.command * self.config.rate * dt.as_secs_f64();
        if let Some((low, high)) = self.config.travel {
            self.position = self.position.clamp(low, high);
        }
    }

    fn reading(&self) -> f64 {
        if self.reversed { -self.position } else { self.position }
    }
}

#[derive(Debug)]
struct SimState {
    now: Duration,
    motors: [SimMotor; 2],
}

impl SimState {
    fn advance(&mut self, dt: Duration) {
        for motor in &mut self.motors {
            motor.advance(dt);
        }
        self.now += dt;
    }
}

/// 模拟台架
///
/// 克隆是轻量的（共享同一个内部状态）。
#[derive(Debug, Clone)]
pub struct SimRig {
    state: Arc<Mutex<SimState>>,
    realtime: bool,
}

impl SimRig {
    /// 创建模拟台架
    pub fn new(config: SimConfig) -> Self {
        let state = SimState {
            now: Duration::ZERO,
            motors: [
                SimMotor::new(config.left, config.history_limit),
                SimMotor::new(config.right, config.history_limit),
            ],
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            realtime: config.realtime,
        }
    }

    /// 获取单个电机句柄
    pub fn actuator(&self, id: ActuatorId) -> SimActuator {
        SimActuator {
            state: self.state.clone(),
            index: id.index(),
        }
    }

    /// 获取电机对
    pub fn pair(&self) -> ActuatorPair<SimActuator> {
        ActuatorPair::new(self.actuator(ActuatorId::Left), self.actuator(ActuatorId::Right))
    }

    /// 获取与台架绑定的时钟
    pub fn clock(&self) -> SimClock {
        SimClock {
            state: self.state.clone(),
            sleeper: self.realtime.then(SpinSleeper::default),
        }
    }

    /// 当前虚拟时间
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// 当前读数（考虑 reversed）
    pub fn position(&self, id: ActuatorId) -> f64 {
        self.state.lock().motors[id.index()].reading()
    }

    /// 直接设置物理位置
    pub fn set_position(&self, id: ActuatorId, position: f64) {
        self.state.lock().motors[id.index()].position = position;
    }

    /// 最近一次下发的命令（从未下发时为 0）
    pub fn last_command(&self, id: ActuatorId) -> f64 {
        self.state.lock().motors[id.index()].last_command
    }

    /// 最近下发的命令（最多 `history_limit` 条，按时间顺序）
    pub fn commands(&self, id: ActuatorId) -> Vec<f64> {
        self.state.lock().motors[id.index()].history.iter().copied().collect()
    }

    /// 冻结 / 解冻电机（模拟堵转）
    pub fn freeze(&self, id: ActuatorId, frozen: bool) {
        self.state.lock().motors[id.index()].frozen = frozen;
    }

    /// 注入 / 清除故障
    pub fn inject_fault(&self, id: ActuatorId, fault: Option<ActuatorFault>) {
        self.state.lock().motors[id.index()].fault = fault;
    }

    /// 手动推进虚拟时间（不经过时钟）
    pub fn advance(&self, dt: Duration) {
        self.state.lock().advance(dt);
    }
}

/// 模拟电机句柄
#[derive(Debug, Clone)]
pub struct SimActuator {
    state: Arc<Mutex<SimState>>,
    index: usize,
}

impl Actuator for SimActuator {
    fn port(&self) -> u8 {
        self.state.lock().motors[self.index].config.port
    }

    fn set_velocity(&mut self, velocity: f64) -> Result<(), ActuatorFault> {
        let mut state = self.state.lock();
        let motor = &mut state.motors[self.index];
        if let Some(fault) = motor.fault.clone() {
            return Err(fault);
        }
        motor.command = if motor.reversed { -velocity } else { velocity };
        motor.record(velocity);
        Ok(())
    }

    fn position(&self) -> Result<f64, ActuatorFault> {
        let state = self.state.lock();
        let motor = &state.motors[self.index];
        if let Some(fault) = motor.fault.clone() {
            return Err(fault);
        }
        Ok(motor.reading())
    }

    fn set_reversed(&mut self, reversed: bool) -> Result<(), ActuatorFault> {
        let mut state = self.state.lock();
        let motor = &mut state.motors[self.index];
        if let Some(fault) = motor.fault.clone() {
            return Err(fault);
        }
        motor.reversed = reversed;
        Ok(())
    }
}

/// 与模拟台架绑定的虚拟时钟
///
/// `sleep` 推进虚拟时间并积分电机位置。
#[derive(Debug, Clone)]
pub struct SimClock {
    state: Arc<Mutex<SimState>>,
    sleeper: Option<SpinSleeper>,
}

impl Clock for SimClock {
    fn now(&self) -> Duration {
        self.state.lock().now
    }

    fn sleep(&self, duration: Duration) {
        if let Some(sleeper) = &self.sleeper {
            sleeper.sleep(duration);
        }
        self.state.lock().advance(duration);
    }
}
