//! Easing Profile - 分段减速曲线
//!
//! 把"距目标的偏差"映射为"速度大小"的纯函数。距离越近速度越低，
//! 防止接近目标时因离散控制和齿隙造成过冲和机械冲击。
//!
//! # 默认曲线
//!
//! | 偏差 | 速度 |
//! | ---- | ---- |
//! | > 200 | 1.25 × HALF |
//! | > 50 | 0.70 × HALF |
//! | > 25 | 0.35 × HALF |
//! | 其余 | 0.25 × HALF |
//!
//! 输出永远在 `[0, max_speed]` 内，方向（符号）由调用方决定。
//!
//! # 示例
//!
//! ```rust
//! use intake_control::EasingProfile;
//!
//! let profile = EasingProfile::default();
//! assert!(profile.speed(300.0) > profile.speed(30.0));
//! assert!(profile.speed(1e9) <= 127.0);
//! ```

use intake_driver::speed;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::ConfigError;

/// 曲线中的一档：偏差严格大于 `above` 时使用 `factor × base_speed`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EasingBand {
    pub above: f64,
    pub factor: f64,
}

/// 分段减速曲线
///
/// 档位按阈值从大到小排列，第一个满足 `offset > above` 的档位生效；
/// 都不满足时使用 `floor_factor`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EasingProfile {
    /// 基准速度（通常为 HALF）
    pub base_speed: f64,

    /// 最低档系数（距离最近时使用）
    pub floor_factor: f64,

    /// 额定最大速度
    pub max_speed: f64,

    /// 档位（阈值严格递减）
    pub bands: Vec<EasingBand>,
}

impl Default for EasingProfile {
    fn default() -> Self {
        Self {
            base_speed: speed::HALF,
            floor_factor: 0.25,
            max_speed: speed::MAX,
            bands: vec![
                EasingBand {
                    above: 200.0,
                    factor: 1.25,
                },
                EasingBand {
                    above: 50.0,
                    factor: 0.70,
                },
                EasingBand {
                    above: 25.0,
                    factor: 0.35,
                },
            ],
        }
    }
}

impl EasingProfile {
    /// 最少档位数（含最低档）
    pub const MIN_LEVELS: usize = 4;

    /// 构造并校验曲线
    pub fn new(
        base_speed: f64,
        bands: Vec<EasingBand>,
        floor_factor: f64,
        max_speed: f64,
    ) -> Result<Self, ConfigError> {
        let profile = Self {
            base_speed,
            bands,
            floor_factor,
            max_speed,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// 校验曲线：档位数、阈值单调、系数单调、速度范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bands.len() + 1 < Self::MIN_LEVELS {
            return Err(ConfigError::Invalid(format!(
                "easing profile needs at least {} levels, got {}",
                Self::MIN_LEVELS,
                self.bands.len() + 1
            )));
        }
        if !(self.base_speed.is_finite() && self.base_speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "easing base_speed must be > 0, got {}",
                self.base_speed
            )));
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0 && self.max_speed <= speed::MAX) {
            return Err(ConfigError::Invalid(format!(
                "easing max_speed must be in (0, {}], got {}",
                speed::MAX,
                self.max_speed
            )));
        }
        if !(self.floor_factor.is_finite() && self.floor_factor >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "easing floor_factor must be >= 0, got {}",
                self.floor_factor
            )));
        }

        for pair in self.bands.windows(2) {
            let (outer, inner) = (pair[0], pair[1]);
            if outer.above.partial_cmp(&inner.above) != Some(Ordering::Greater) {
                return Err(ConfigError::Invalid(format!(
                    "easing thresholds must strictly decrease ({} then {})",
                    outer.above, inner.above
                )));
            }
            if outer.factor < inner.factor {
                return Err(ConfigError::Invalid(format!(
                    "easing factors must not increase toward the target ({} then {})",
                    outer.factor, inner.factor
                )));
            }
        }

        for band in &self.bands {
            if !(band.above.is_finite() && band.above >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "easing threshold must be >= 0, got {}",
                    band.above
                )));
            }
            if !(band.factor.is_finite() && band.factor >= self.floor_factor) {
                return Err(ConfigError::Invalid(format!(
                    "easing factor {} is below floor factor {}",
                    band.factor, self.floor_factor
                )));
            }
        }

        Ok(())
    }

    /// 偏差 → 速度大小
    ///
    /// 取 `offset` 的绝对值；NaN 视为已接近目标（最低档）。
    pub fn speed(&self, offset: f64) -> f64 {
        let offset = offset.abs();
        let factor = self
            .bands
            .iter()
            .find(|band| offset > band.above)
            .map(|band| band.factor)
            .unwrap_or(self.floor_factor);

        (self.base_speed * factor).clamp(0.0, self.max_speed)
    }

    /// 最低档速度
    pub fn floor_speed(&self) -> f64 {
        (self.base_speed * self.floor_factor).clamp(0.0, self.max_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let profile = EasingProfile::default();
        assert!(profile.validate().is_ok());

        assert!((profile.speed(201.0) - 63.0 * 1.25).abs() < 1e-9);
        assert!((profile.speed(200.0) - 63.0 * 0.70).abs() < 1e-9); // 阈值本身属于下一档
        assert!((profile.speed(51.0) - 63.0 * 0.70).abs() < 1e-9);
        assert!((profile.speed(26.0) - 63.0 * 0.35).abs() < 1e-9);
        assert!((profile.speed(25.0) - 63.0 * 0.25).abs() < 1e-9);
        assert!((profile.speed(0.0) - 63.0 * 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_negative_and_nan_offsets() {
        let profile = EasingProfile::default();
        assert_eq!(profile.speed(-300.0), profile.speed(300.0));
        assert_eq!(profile.speed(f64::NAN), profile.floor_speed());
    }

    #[test]
    fn test_clamped_to_max_speed() {
        let profile = EasingProfile {
            base_speed: 120.0,
            ..EasingProfile::default()
        };
        // 120 × 1.25 = 150 > 127
        assert_eq!(profile.speed(1000.0), speed::MAX);
    }

    #[test]
    fn test_rejects_too_few_levels() {
        let result = EasingProfile::new(
            63.0,
            vec![EasingBand {
                above: 50.0,
                factor: 1.0,
            }],
            0.25,
            127.0,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_non_monotonic_factors() {
        let mut profile = EasingProfile::default();
        profile.bands[2].factor = 0.9; // 比外侧档位更快
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_rejects_unsorted_thresholds() {
        let mut profile = EasingProfile::default();
        profile.bands.swap(0, 1);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_rejects_nan_threshold() {
        let mut profile = EasingProfile::default();
        profile.bands[1].above = f64::NAN;
        assert!(matches!(profile.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_speeds() {
        let profile = EasingProfile {
            max_speed: 500.0,
            ..EasingProfile::default()
        };
        assert!(profile.validate().is_err());

        let profile = EasingProfile {
            base_speed: 0.0,
            ..EasingProfile::default()
        };
        assert!(profile.validate().is_err());
    }
}
