//! 速度档位常量
//!
//! 单位为电机的有符号 "move" 命令，范围 `[-MAX, MAX]`。
//! 档位取整数除法结果（`127 / 4 = 31`），与固件的整数档位一致。

/// 停止
pub const ZERO: f64 = 0.0;

/// 25%
pub const QUARTER: f64 = (127 / 4) as f64;

/// 50%
pub const HALF: f64 = (127 / 2) as f64;

/// 75%
pub const THREE_QUARTERS: f64 = 95.0;

/// 额定最大速度
pub const MAX: f64 = 127.0;

/// 把命令钳位到额定范围内
#[inline]
pub fn clamp(velocity: f64) -> f64 {
    if velocity.is_nan() {
        return ZERO;
    }
    velocity.clamp(-MAX, MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(QUARTER, 31.0);
        assert_eq!(HALF, 63.0);
        assert_eq!(THREE_QUARTERS, 95.0);
        assert!(ZERO < QUARTER && QUARTER < HALF && HALF < THREE_QUARTERS && THREE_QUARTERS < MAX);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(200.0), MAX);
        assert_eq!(clamp(-200.0), -MAX);
        assert_eq!(clamp(42.0), 42.0);
        assert_eq!(clamp(f64::NAN), ZERO);
    }
}
