//! 会话：配置加载 + 模拟台架 + 机械臂
//!
//! 每个 one-shot 命令和每个 REPL 都拥有一个独立的会话。
//! 台架状态不跨进程保存，因此新会话总是从未校准开始。

use anyhow::{Context, Result};
use intake_control::{IntakeArm, IntakeConfig};
use intake_driver::mock::{SimActuator, SimClock, SimRig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 默认配置文件路径
///
/// - Linux: `~/.config/intake/config.toml`
/// - macOS: `~/Library/Application Support/intake/config.toml`
/// - Windows: `%APPDATA%\intake\config.toml`
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("intake");
    path.push("config.toml");
    Ok(path)
}

/// 解析配置文件路径（命令行优先）
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_file(),
    }
}

/// 加载配置
///
/// 显式指定的文件必须存在；默认路径不存在时使用默认配置。
pub fn load_config(explicit: Option<&Path>) -> Result<IntakeConfig> {
    let path = config_path(explicit)?;

    if explicit.is_none() && !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(IntakeConfig::default());
    }

    let content =
        fs::read_to_string(&path).with_context(|| format!("读取配置文件失败: {}", path.display()))?;
    IntakeConfig::from_toml_str(&content).with_context(|| format!("配置文件无效: {}", path.display()))
}

/// 命令执行会话
pub struct Session {
    pub config: IntakeConfig,
    pub rig: SimRig,
    pub arm: IntakeArm<SimActuator, SimClock>,
}

impl Session {
    /// 按配置创建模拟台架和机械臂
    pub fn new(config: IntakeConfig, realtime: bool) -> Result<Self> {
        let rig = SimRig::new(config.sim.to_sim_config(&config.pair).with_realtime(realtime));
        let arm = IntakeArm::new(rig.pair(), rig.clock(), &config).context("初始化机械臂失败")?;
        Ok(Self { config, rig, arm })
    }

    /// 从命令行参数创建
    pub fn open(config_file: Option<&Path>, realtime: bool) -> Result<Self> {
        let config = load_config(config_file)?;
        Self::new(config, realtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("missing.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[controller]\ntick_ms = 5\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.controller.tick_ms, 5);
    }

    #[test]
    fn test_sim_rig_follows_config() {
        let mut config = IntakeConfig::default();
        config.pair.left_port = 3;
        config.pair.right_port = 4;
        config.sim.span = 90.0;

        let sim = config.sim.to_sim_config(&config.pair);
        assert_eq!(sim.left.travel, Some((0.0, 90.0)));
        assert_eq!(sim.right.travel, Some((-90.0, 0.0)));

        let mut session = Session::new(config, false).unwrap();
        assert_eq!(session.arm.pair().ports(), [3, 4]);

        let report = session.arm.calibrate().unwrap();
        assert_eq!(report.bounds.left.max, 90.0);
        assert_eq!(report.bounds.right.max, -90.0);
    }

    #[test]
    fn test_session_starts_uncalibrated() {
        let session = Session::new(IntakeConfig::default(), false).unwrap();
        assert!(!session.arm.tracker().is_calibrated());
        assert_eq!(session.arm.pair().ports(), [9, 10]);
    }
}
