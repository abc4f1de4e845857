//! # 配置模块
//!
//! ## 设计思路
//!
//! 将归一化阶段的“可调策略”集中到 `TransformConfig`。
//! 缩放档位（quality / balanced / speed）作为高层语义，映射到底层滤镜。
//!
//! ## 实现思路
//!
//! - `Default` 使用最近邻缩放（不保证插值质量）。
//! - `ScalingProfile` 负责档位字符串解析与反向输出。
//! - 像素与内存上限在完整解码前按图片头尺寸校验。

use std::str::FromStr;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use super::TransformError;

/// 图片归一化配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// 缩放档位。
    pub scaling_profile: ScalingProfile,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            scaling_profile: ScalingProfile::Speed,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
        }
    }
}

impl TransformConfig {
    pub fn resize_filter(&self) -> FilterType {
        self.scaling_profile.filter()
    }
}

/// 缩放档位（面向产品/用户语义）。
///
/// - `Quality`：CatmullRom，尽量保真
/// - `Balanced`：双线性
/// - `Speed`：最近邻，默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingProfile {
    Quality,
    Balanced,
    Speed,
}

impl ScalingProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use media_bridge::transform::ScalingProfile;
    ///
    /// let p = ScalingProfile::parse("balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), media_bridge::transform::TransformError>(())
    /// ```
    pub fn parse(profile: &str) -> Result<Self, TransformError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(TransformError::InvalidOption(format!(
                "未知缩放档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }

    pub fn filter(self) -> FilterType {
        match self {
            Self::Quality => FilterType::CatmullRom,
            Self::Balanced => FilterType::Triangle,
            Self::Speed => FilterType::Nearest,
        }
    }
}

impl FromStr for ScalingProfile {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_uses_nearest_filter() {
        let config = TransformConfig::default();
        assert_eq!(config.scaling_profile, ScalingProfile::Speed);
        assert_eq!(config.resize_filter(), FilterType::Nearest);
    }

    #[test]
    fn parse_rejects_unknown_profile() {
        assert!(matches!(
            ScalingProfile::parse("ultra"),
            Err(TransformError::InvalidOption(_))
        ));
        assert_eq!(ScalingProfile::parse(" QUALITY ").expect("parse"), ScalingProfile::Quality);
    }

    #[test]
    fn from_str_matches_parse() {
        let parsed: ScalingProfile = "speed".parse().expect("parse speed");
        assert_eq!(parsed, ScalingProfile::Speed);
        assert!("fast".parse::<ScalingProfile>().is_err());
    }
}
