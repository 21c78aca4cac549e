//! 安全确认
//!
//! 校准会让机械臂全行程扫动，执行前需要确认机械臂无阻挡。

use anyhow::Result;

/// 校准前确认
///
/// `assume_yes` 为 true 时跳过提示（脚本 / CI 使用）。
pub fn confirm_calibration(assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    println!("⚠️  校准会让 intake 机械臂从当前位置扫动到打开极限");
    println!("   请确认机械臂周围无阻挡");

    let confirmed = inquire::Confirm::new("开始校准？")
        .with_default(false) // 默认为 No（安全优先）
        .prompt()
        .map_err(|e| anyhow::anyhow!("用户交互失败: {}（非交互环境请使用 --yes）", e))?;

    Ok(confirmed)
}
