use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::TransformError;

/// 照片输出尺寸档位。
///
/// 缩放因子同时作用于宽和高；`Full` 表示不缩放，只做方向校正。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSize {
    #[default]
    Full,
    Large,
    Medium,
    Small,
}

impl PhotoSize {
    pub fn factor(self) -> f64 {
        match self {
            Self::Full => 1.0,
            Self::Large => 0.75,
            Self::Medium => 0.5,
            Self::Small => 0.25,
        }
    }

    pub fn is_full(self) -> bool {
        matches!(self, Self::Full)
    }

    /// 按档位计算目标尺寸（四舍五入，单边至少 1 像素）。
    pub fn scaled_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        let factor = self.factor();
        let scale = |value: u32| ((value as f64 * factor).round() as u32).max(1);
        (scale(width), scale(height))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Large => "large",
            Self::Medium => "medium",
            Self::Small => "small",
        }
    }
}

impl FromStr for PhotoSize {
    type Err = TransformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "large" => Ok(Self::Large),
            "medium" => Ok(Self::Medium),
            "small" => Ok(Self::Small),
            other => Err(TransformError::InvalidOption(format!(
                "未知尺寸档位：{}（可选：full / large / medium / small）",
                other
            ))),
        }
    }
}

impl fmt::Display for PhotoSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
