//! IntakeArm - 机械臂编排
//!
//! 持有电机对、位置跟踪器、控制器和校准流程，并用模式标志决定谁拥有电机：
//!
//! - 自动运动（校准 / 打开 / 闭合）只能从 `Idle` 开始，结束后回到 `Idle`
//! - 手动接管期间拒绝自动运动，返回 [`ControlError::ModeConflict`]
//! - 自动运动期间拒绝手动驱动
//!
//! 所有运动方法都需要 `&mut self`，同一对电机上不可能出现重叠的运动请求。
//! 模式标志和状态板通过 `Arc` 共享给显示线程。

use intake_driver::{Actuator, ActuatorPair, ArmMode, AtomicArmMode, Clock};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{debug, info};

use crate::calibration::{CalibrationReport, Calibrator};
use crate::config::IntakeConfig;
use crate::controller::{MotionController, MotionReport, MotionRequest};
use crate::error::ControlError;
use crate::input::{Direction, OverrideInput};
use crate::status::StatusBoard;
use crate::tracker::{PositionTracker, Target};

/// 自动运动期间持有的模式；离开作用域时回到 Idle
struct ModeLease {
    mode: Arc<AtomicArmMode>,
    status: Arc<StatusBoard>,
}

impl ModeLease {
    fn acquire(
        mode: &Arc<AtomicArmMode>,
        status: &Arc<StatusBoard>,
        next: ArmMode,
    ) -> Result<Self, ControlError> {
        if !mode.compare_exchange(ArmMode::Idle, next, Ordering::AcqRel, Ordering::Acquire) {
            return Err(ControlError::ModeConflict {
                current: mode.get(Ordering::Acquire),
            });
        }
        status.set_mode(next);
        Ok(Self {
            mode: mode.clone(),
            status: status.clone(),
        })
    }
}

impl Drop for ModeLease {
    fn drop(&mut self) {
        self.mode.set(ArmMode::Idle, Ordering::Release);
        self.status.set_mode(ArmMode::Idle);
    }
}

/// intake 机械臂
pub struct IntakeArm<A: Actuator, C: Clock> {
    pair: ActuatorPair<A>,
    tracker: PositionTracker,
    controller: MotionController<C>,
    calibrator: Calibrator,
    open_request: MotionRequest,
    close_request: MotionRequest,
    mode: Arc<AtomicArmMode>,
    status: Arc<StatusBoard>,
}

impl<A: Actuator, C: Clock> IntakeArm<A, C> {
    /// 按配置创建机械臂，并设置两侧的反转标志
    pub fn new(mut pair: ActuatorPair<A>, clock: C, config: &IntakeConfig) -> Result<Self, ControlError> {
        pair.configure(config.pair.reversed())?;

        let status = Arc::new(StatusBoard::new());
        let controller = MotionController::new(clock, config.controller.clone()).with_status(status.clone());
        let calibrator = Calibrator::new(config.calibration).with_settle_request(config.close_request());

        info!("Intake arm ready on ports {:?}", pair.ports());

        Ok(Self {
            pair,
            tracker: PositionTracker::new(),
            controller,
            calibrator,
            open_request: config.open_request(),
            close_request: config.close_request(),
            mode: Arc::new(AtomicArmMode::default()),
            status,
        })
    }

    /// 当前模式
    pub fn mode(&self) -> ArmMode {
        self.mode.get(Ordering::Acquire)
    }

    /// 共享的模式标志（只读用途）
    pub fn mode_handle(&self) -> Arc<AtomicArmMode> {
        self.mode.clone()
    }

    /// 共享的状态板
    pub fn status(&self) -> Arc<StatusBoard> {
        self.status.clone()
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn pair(&self) -> &ActuatorPair<A> {
        &self.pair
    }

    /// 读取当前位置并发布到状态板
    pub fn positions(&self) -> Result<[f64; 2], ControlError> {
        let positions = self.pair.positions()?;
        self.status.publish_positions(positions);
        Ok(positions)
    }

    /// 执行启动校准
    pub fn calibrate(&mut self) -> Result<CalibrationReport, ControlError> {
        let _lease = ModeLease::acquire(&self.mode, &self.status, ArmMode::Calibrating)?;
        self.calibrator.run(&mut self.pair, &mut self.tracker, &self.controller)
    }

    /// 开合请求（手动输入或上层调度）
    pub fn request(&mut self, direction: Direction) -> Result<MotionReport, ControlError> {
        let request = match direction {
            Direction::Open => self.open_request,
            Direction::Close => self.close_request,
        };
        self.move_with(request)
    }

    /// 使用自定义参数运动
    pub fn move_with(&mut self, request: MotionRequest) -> Result<MotionReport, ControlError> {
        // 未校准时不占用模式
        self.tracker.calibrated()?;

        let next = match request.target {
            Target::Max => ArmMode::MovingToOpen,
            Target::Min => ArmMode::MovingToClose,
        };
        let _lease = ModeLease::acquire(&self.mode, &self.status, next)?;
        self.controller.move_to_bound(&mut self.pair, &self.tracker, request)
    }

    /// 处理一次输入采样，新按下时执行对应运动
    pub fn handle_input(
        &mut self,
        input: &mut OverrideInput,
        open_held: bool,
        close_held: bool,
    ) -> Result<Option<MotionReport>, ControlError> {
        match input.poll(open_held, close_held) {
            Some(direction) => {
                debug!("Input requested {}", direction);
                self.request(direction).map(Some)
            },
            None => Ok(None),
        }
    }

    /// 进入手动接管
    ///
    /// 已处于手动模式时直接返回。
    pub fn begin_manual(&mut self) -> Result<(), ControlError> {
        if self.mode().is_manual() {
            return Ok(());
        }
        if !self
            .mode
            .compare_exchange(ArmMode::Idle, ArmMode::Manual, Ordering::AcqRel, Ordering::Acquire)
        {
            return Err(ControlError::ModeConflict {
                current: self.mode(),
            });
        }
        self.status.set_mode(ArmMode::Manual);
        info!("Manual override engaged");
        Ok(())
    }

    /// 手动驱动（镜像：左 +speed，右 -speed）
    pub fn manual_drive(&mut self, speed: f64) -> Result<(), ControlError> {
        let current = self.mode();
        if !current.is_manual() {
            return Err(ControlError::ModeConflict { current });
        }
        self.pair.command_mirrored(speed)?;
        Ok(())
    }

    /// 退出手动接管：两侧停止并回到 Idle
    pub fn end_manual(&mut self) -> Result<(), ControlError> {
        let current = self.mode();
        if !current.is_manual() {
            return Err(ControlError::ModeConflict { current });
        }
        let stopped = self.pair.stop();
        self.mode.set(ArmMode::Idle, Ordering::Release);
        self.status.set_mode(ArmMode::Idle);
        info!("Manual override released");
        stopped.map_err(ControlError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_driver::ActuatorId;
    use intake_driver::mock::{SimActuator, SimClock, SimConfig, SimRig};

    fn arm() -> (SimRig, IntakeArm<SimActuator, SimClock>) {
        let rig = SimRig::new(SimConfig::default());
        let arm = IntakeArm::new(rig.pair(), rig.clock(), &IntakeConfig::default()).unwrap();
        (rig, arm)
    }

    #[test]
    fn test_uncalibrated_request_keeps_idle() {
        let (_rig, mut arm) = arm();
        let result = arm.request(Direction::Open);
        assert!(matches!(result, Err(ControlError::Uncalibrated)));
        assert_eq!(arm.mode(), ArmMode::Idle);
    }

    #[test]
    fn test_mode_returns_to_idle_after_motion() {
        let (_rig, mut arm) = arm();
        arm.calibrate().unwrap();
        assert_eq!(arm.mode(), ArmMode::Idle);

        arm.request(Direction::Open).unwrap();
        assert_eq!(arm.mode(), ArmMode::Idle);
        assert_eq!(arm.status().snapshot().mode, ArmMode::Idle);
    }

    #[test]
    fn test_manual_blocks_automatic_motion() {
        let (rig, mut arm) = arm();
        arm.calibrate().unwrap();
        arm.begin_manual().unwrap();
        arm.begin_manual().unwrap();

        let result = arm.request(Direction::Close);
        assert!(matches!(
            result,
            Err(ControlError::ModeConflict {
                current: ArmMode::Manual
            })
        ));
        assert!(arm.calibrate().is_err());

        arm.manual_drive(40.0).unwrap();
        assert_eq!(rig.last_command(ActuatorId::Left), 40.0);
        assert_eq!(rig.last_command(ActuatorId::Right), -40.0);

        arm.end_manual().unwrap();
        assert_eq!(arm.mode(), ArmMode::Idle);
        assert_eq!(rig.last_command(ActuatorId::Left), 0.0);
        assert!(arm.request(Direction::Close).is_ok());
    }

    #[test]
    fn test_manual_drive_requires_manual_mode() {
        let (rig, mut arm) = arm();
        let result = arm.manual_drive(31.0);
        assert!(matches!(
            result,
            Err(ControlError::ModeConflict {
                current: ArmMode::Idle
            })
        ));
        assert!(rig.commands(ActuatorId::Left).is_empty());
        assert!(arm.end_manual().is_err());
    }

    #[test]
    fn test_manual_refused_while_automatic_mode_is_held() {
        let (_rig, mut arm) = arm();
        // 模拟另一个控制流持有模式
        arm.mode_handle().set(ArmMode::MovingToOpen, Ordering::Release);
        assert!(matches!(
            arm.begin_manual(),
            Err(ControlError::ModeConflict {
                current: ArmMode::MovingToOpen
            })
        ));
    }

    #[test]
    fn test_handle_input_edges() {
        let (_rig, mut arm) = arm();
        arm.calibrate().unwrap();
        let mut input = OverrideInput::new();

        assert!(arm.handle_input(&mut input, false, false).unwrap().is_none());
        assert!(arm.handle_input(&mut input, true, false).unwrap().is_some());
        // 按住不放不重复触发
        assert!(arm.handle_input(&mut input, true, false).unwrap().is_none());
    }

    #[test]
    fn test_repeated_cycles_keep_sim_history_bounded() {
        let rig = SimRig::new(SimConfig::default().with_history_limit(64));
        let mut arm = IntakeArm::new(rig.pair(), rig.clock(), &IntakeConfig::default()).unwrap();
        arm.calibrate().unwrap();

        for _ in 0..200 {
            arm.request(Direction::Open).unwrap();
            arm.request(Direction::Close).unwrap();
        }
        assert!(rig.commands(ActuatorId::Left).len() <= 64);
        assert_eq!(rig.last_command(ActuatorId::Left), 0.0);
    }

    #[test]
    fn test_mode_released_on_fault() {
        let (rig, mut arm) = arm();
        arm.calibrate().unwrap();
        rig.inject_fault(
            ActuatorId::Right,
            Some(intake_driver::ActuatorFault::Disconnected { port: 10 }),
        );
        assert!(matches!(
            arm.request(Direction::Open),
            Err(ControlError::Actuator(_))
        ));
        assert_eq!(arm.mode(), ArmMode::Idle);
    }
}
