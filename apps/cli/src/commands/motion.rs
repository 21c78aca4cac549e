//! 运动命令：calibrate / open / close / cycle / status

use anyhow::{Context, Result, bail};
use clap::Args;
use intake_control::{CalibrationReport, Direction, MotionReport, Outcome};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::safety::confirm_calibration;
use crate::session::Session;

/// 循环开合参数
#[derive(Args, Debug)]
pub struct CycleCommand {
    /// 开合次数（0 表示直到 Ctrl+C）
    #[arg(short, long, default_value_t = 1)]
    pub count: u32,
}

/// 状态查询参数
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

pub fn print_calibration(report: &CalibrationReport) {
    let bounds = report.bounds;
    println!("✅ 校准完成");
    println!("  left:  min {:>8.1}  max {:>8.1}", bounds.left.min, bounds.left.max);
    println!("  right: min {:>8.1}  max {:>8.1}", bounds.right.min, bounds.right.max);
    match report.settle {
        Some(settle) if settle.outcome == Outcome::Reached => {
            println!("  已回到闭合位置（{:?}）", settle.elapsed)
        },
        Some(_) => println!("⚠️  回到闭合位置超时"),
        None => {},
    }
}

pub fn print_motion(direction: Direction, report: &MotionReport) {
    let [left, right] = report.final_positions;
    match report.outcome {
        Outcome::Reached => println!(
            "✅ {}: reached in {:?} ({} ticks), left {:.1}, right {:.1}",
            direction, report.elapsed, report.ticks, left, right
        ),
        Outcome::TimedOut => println!(
            "⚠️  {}: timed out after {:?}, left {:.1}, right {:.1}",
            direction, report.elapsed, left, right
        ),
    }
}

/// 校准（需要确认）
pub fn calibrate(session: &mut Session, assume_yes: bool) -> Result<CalibrationReport> {
    if !confirm_calibration(assume_yes)? {
        bail!("校准已取消");
    }
    println!("⏳ 校准中...");
    let report = session.arm.calibrate().context("校准失败")?;
    print_calibration(&report);
    Ok(report)
}

/// 校准后执行一次开或合
pub fn move_once(session: &mut Session, direction: Direction, assume_yes: bool) -> Result<()> {
    calibrate(session, assume_yes)?;
    let report = session
        .arm
        .request(direction)
        .with_context(|| format!("{} 失败", direction))?;
    print_motion(direction, &report);
    Ok(())
}

impl CycleCommand {
    pub fn execute(&self, session: &mut Session, assume_yes: bool) -> Result<()> {
        let running = Arc::new(AtomicBool::new(true));
        let handler_flag = running.clone();
        ctrlc::set_handler(move || {
            handler_flag.store(false, Ordering::SeqCst);
        })
        .context("设置 Ctrl+C 处理失败")?;

        calibrate(session, assume_yes)?;

        let mut completed = 0u32;
        let mut timeouts = 0u32;
        while running.load(Ordering::SeqCst) && (self.count == 0 || completed < self.count) {
            for direction in [Direction::Open, Direction::Close] {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let report = session.arm.request(direction)?;
                if report.outcome == Outcome::TimedOut {
                    timeouts += 1;
                }
                print_motion(direction, &report);
            }
            completed += 1;
        }

        if !running.load(Ordering::SeqCst) {
            println!("🛑 已中断");
        }
        info!("Cycle finished: {} cycles, {} timeouts", completed, timeouts);
        println!("📊 完成 {} 次开合，超时 {} 次", completed, timeouts);
        Ok(())
    }
}

/// JSON 状态输出
#[derive(Debug, Serialize)]
struct StatusView<'a> {
    ports: [u8; 2],
    calibrated: bool,
    status: &'a intake_control::ArmStatus,
}

impl StatusCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        session.arm.positions().context("读取位置失败")?;
        let snapshot = session.arm.status().snapshot();

        if self.json {
            let view = StatusView {
                ports: session.arm.pair().ports(),
                calibrated: session.arm.tracker().is_calibrated(),
                status: &snapshot,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
            return Ok(());
        }

        print_status(session);
        Ok(())
    }
}

/// 打印人类可读的状态
pub fn print_status(session: &Session) {
    let snapshot = session.arm.status().snapshot();
    let [left_port, right_port] = session.arm.pair().ports();

    println!("📊 Intake 状态");
    println!("  模式: {}", snapshot.mode);
    println!("  端口: left {}, right {}", left_port, right_port);
    match snapshot.positions {
        Some([left, right]) => println!("  位置: left {:.1}, right {:.1}", left, right),
        None => println!("  位置: -"),
    }
    match snapshot.bounds {
        Some(bounds) => {
            println!("  边界 left:  {:.1} .. {:.1}", bounds.left.min, bounds.left.max);
            println!("  边界 right: {:.1} .. {:.1}", bounds.right.min, bounds.right.max);
        },
        None => println!("  边界: 未校准"),
    }
    if let Some(outcome) = snapshot.last_outcome {
        println!("  上次运动: {}", outcome);
    }
}
