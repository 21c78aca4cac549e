//! REPL 模式（交互式 Shell）
//!
//! 会话在整个 Shell 生命周期内保持，校准结果和手动接管状态都会保留。
//! 模拟台架只在命令执行时推进时间。

use anyhow::{Result, bail};
use intake_control::Direction;
use intake_driver::Clock;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use std::time::Duration;

use crate::commands::motion::{calibrate, print_motion, print_status};
use crate::session::Session;

/// 手动驱动默认持续时间
const DEFAULT_MANUAL_MS: u64 = 200;

fn history_file() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push("intake");
        path.push("history.txt");
        path
    })
}

/// 运行 REPL 模式
pub fn run_repl(mut session: Session, assume_yes: bool) -> Result<()> {
    let mut rl = DefaultEditor::new().map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;

    let history = history_file();
    if let Some(path) = &history {
        rl.load_history(path).ok(); // 首次运行时不存在
    }

    println!("Intake CLI v{} - 交互式 Shell", env!("CARGO_PKG_VERSION"));
    println!("输入 'help' 查看帮助，'exit' 退出");
    println!();

    loop {
        match rl.readline("intake> ") {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match line.as_str() {
                    "exit" | "quit" => break,
                    "help" => print_help(),
                    _ => {
                        if let Err(err) = handle_command(&line, &mut session, assume_yes) {
                            eprintln!("❌ Error: {:#}", err);
                        }
                    },
                }
            },

            Err(ReadlineError::Interrupted) => {
                // Ctrl+C：停止手动驱动
                println!("^C");
                if session.arm.mode().is_manual() {
                    release(&mut session)?;
                }
            },

            Err(ReadlineError::Eof) => break,

            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            },
        }
    }

    if session.arm.mode().is_manual() {
        release(&mut session)?;
    }
    if let Some(path) = &history {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        rl.save_history(path).ok();
    }

    println!("👋 再见！");
    Ok(())
}

/// 处理命令
fn handle_command(line: &str, session: &mut Session, assume_yes: bool) -> Result<()> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    match parts.as_slice() {
        ["calibrate"] => {
            calibrate(session, assume_yes)?;
        },

        ["open"] => run_move(session, Direction::Open)?,

        ["close"] => run_move(session, Direction::Close)?,

        ["manual", speed, rest @ ..] => {
            let speed: f64 = speed.parse().map_err(|_| anyhow::anyhow!("无效速度: {}", speed))?;
            let duration_ms = match rest {
                [] => DEFAULT_MANUAL_MS,
                [ms] => ms.parse().map_err(|_| anyhow::anyhow!("无效时长: {}", ms))?,
                _ => bail!("用法: manual <speed> [ms]"),
            };
            manual(session, speed, duration_ms)?;
        },

        ["release"] => release(session)?,

        ["status"] => {
            session.arm.positions()?;
            print_status(session);
        },

        _ => {
            print_help_hint(line);
        },
    }

    Ok(())
}

fn run_move(session: &mut Session, direction: Direction) -> Result<()> {
    let report = session.arm.request(direction)?;
    print_motion(direction, &report);
    Ok(())
}

fn manual(session: &mut Session, speed: f64, duration_ms: u64) -> Result<()> {
    session.arm.begin_manual()?;
    session.arm.manual_drive(speed)?;
    session.rig.clock().sleep(Duration::from_millis(duration_ms));

    let [left, right] = session.arm.positions()?;
    println!(
        "🕹  manual {:.0} for {} ms: left {:.1}, right {:.1}（'release' 退出手动）",
        speed, duration_ms, left, right
    );
    Ok(())
}

fn release(session: &mut Session) -> Result<()> {
    session.arm.end_manual()?;
    println!("✅ 已退出手动接管");
    Ok(())
}

/// 打印帮助信息
fn print_help() {
    println!("可用命令:");
    println!("  calibrate              启动校准（记录 MIN / MAX）");
    println!("  open                   打开到 MAX");
    println!("  close                  闭合到 MIN");
    println!("  manual <speed> [ms]    手动镜像驱动（默认 {} ms）", DEFAULT_MANUAL_MS);
    println!("  release                退出手动接管并停止");
    println!("  status                 显示状态");
    println!("  help                   显示帮助");
    println!("  exit | quit            退出");
}

fn print_help_hint(line: &str) {
    let cmd = line.split_whitespace().next().unwrap_or(line);
    eprintln!("❓ 未知命令: {}（输入 'help' 查看帮助）", cmd);
}
