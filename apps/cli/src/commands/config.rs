//! 配置管理命令

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use intake_control::IntakeConfig;
use std::path::Path;

use crate::session::{config_path, load_config};

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 写入默认配置文件
    Init {
        /// 覆盖已有文件
        #[arg(long)]
        force: bool,
    },

    /// 显示当前生效的配置
    Show,

    /// 显示配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self, config_file: Option<&Path>) -> Result<()> {
        match self {
            ConfigCommand::Init { force } => Self::init_(config_file, force),
            ConfigCommand::Show => Self::show_(config_file),
            ConfigCommand::Path => {
                println!("{}", config_path(config_file)?.display());
                Ok(())
            },
        }
    }

    fn init_(config_file: Option<&Path>, force: bool) -> Result<()> {
        let path = config_path(config_file)?;
        if path.exists() && !force {
            bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
        }

        IntakeConfig::default()
            .save_to_file(&path)
            .with_context(|| format!("写入配置文件失败: {}", path.display()))?;

        println!("✅ 已写入默认配置: {}", path.display());
        Ok(())
    }

    fn show_(config_file: Option<&Path>) -> Result<()> {
        let config = load_config(config_file)?;
        let text = config.to_toml_string().context("序列化配置失败")?;
        print!("{}", text);
        Ok(())
    }
}
