//! 运行配置模块
//!
//! # 设计思路
//!
//! 所有可调参数集中在 `MediaConfig`，以 JSON 文件持久化。
//! 配置文件缺失或损坏时回退到默认值，保证服务总能启动。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::MediaError;
use crate::transform::TransformConfig;

/// 默认 JPEG 质量。
pub const DEFAULT_QUALITY: u8 = 92;
/// 单次多选最多接收的条目数。
pub const DEFAULT_MAX_PICKED_ITEMS: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// 应用私有媒体根目录（临时副本与拍摄输出都落在这里）。
    pub media_root: PathBuf,
    /// 公共相册根目录；未配置时 `save_to_album` 请求会失败。
    pub public_album_root: Option<PathBuf>,
    /// 调用方未指定时使用的 JPEG 质量（0–100）。
    pub default_quality: u8,
    pub max_picked_items: usize,
    pub transform: TransformConfig,
}

impl Default for MediaConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            media_root: base.join("media-bridge").join("media"),
            public_album_root: dirs::picture_dir(),
            default_quality: DEFAULT_QUALITY,
            max_picked_items: DEFAULT_MAX_PICKED_ITEMS,
            transform: TransformConfig::default(),
        }
    }
}

impl MediaConfig {
    /// 从 JSON 文件读取配置，文件缺失或无法解析时返回默认配置。
    pub fn load_from_path(config_path: &Path) -> Self {
        if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(err) => log::warn!(
                        "解析配置文件失败，使用默认配置 - 路径: {} 原因: {}",
                        config_path.display(),
                        err
                    ),
                },
                Err(err) => log::warn!(
                    "读取配置文件失败，使用默认配置 - 路径: {} 原因: {}",
                    config_path.display(),
                    err
                ),
            }
        }
        Self::default()
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), MediaError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| MediaError::Storage(format!("创建配置目录失败: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| MediaError::Storage(format!("序列化配置失败: {}", e)))?;
        fs::write(config_path, content)
            .map_err(|e| MediaError::Storage(format!("写入配置文件失败: {}", e)))?;
        Ok(())
    }
}
