//! # Intake CLI
//!
//! Command-line interface for the intake arm controller, running against the
//! simulated actuator rig.
//!
//! ## 双模式架构
//!
//! ### One-shot 模式（推荐用于 CI/脚本）
//!
//! ```bash
//! # 写入默认配置
//! intake-cli config init
//!
//! # 校准后打开（内部：建台架 -> 校准 -> 运动）
//! intake-cli --yes open
//!
//! # 连续开合 10 次
//! intake-cli --yes cycle --count 10
//! ```
//!
//! ### REPL 模式（推荐用于调试）
//!
//! ```bash
//! $ intake-cli shell
//! intake> calibrate
//! intake> open
//! intake> manual 40
//! intake> release
//! intake> exit
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use intake_control::Direction;
use std::path::PathBuf;

mod commands;
mod modes;
mod safety;
mod session;

use commands::{ConfigCommand, CycleCommand, StatusCommand};
use modes::repl::run_repl;
use session::Session;

/// Intake CLI - 机械臂命令行工具
#[derive(Parser, Debug)]
#[command(name = "intake-cli")]
#[command(about = "Command-line interface for the intake arm controller", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件（默认：<config_dir>/intake/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 模拟台架按真实时间运行
    #[arg(long, global = true)]
    realtime: bool,

    /// 跳过校准前的确认
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 启动校准（记录 MIN / MAX）
    Calibrate,

    /// 校准后打开到 MAX
    Open,

    /// 校准后闭合到 MIN
    Close,

    /// 校准后连续开合
    Cycle {
        #[command(flatten)]
        args: CycleCommand,
    },

    /// 查询机械臂状态
    Status {
        #[command(flatten)]
        args: StatusCommand,
    },

    /// 启动交互式 Shell（REPL 模式）
    Shell,
}

fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，不干扰 --json）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake_cli=info".parse()?)
                .add_directive("intake_control=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Config(cmd) => cmd.execute(config_file),

        Commands::Calibrate => {
            let mut session = Session::open(config_file, cli.realtime)?;
            commands::motion::calibrate(&mut session, cli.yes)?;
            Ok(())
        },

        Commands::Open => {
            let mut session = Session::open(config_file, cli.realtime)?;
            commands::motion::move_once(&mut session, Direction::Open, cli.yes)
        },

        Commands::Close => {
            let mut session = Session::open(config_file, cli.realtime)?;
            commands::motion::move_once(&mut session, Direction::Close, cli.yes)
        },

        Commands::Cycle { args } => {
            let mut session = Session::open(config_file, cli.realtime)?;
            args.execute(&mut session, cli.yes)
        },

        Commands::Status { args } => {
            let session = Session::open(config_file, cli.realtime)?;
            args.execute(&session)
        },

        Commands::Shell => {
            let session = Session::open(config_file, cli.realtime)?;
            run_repl(session, cli.yes)
        },
    }
}
