use serde::{Deserialize, Serialize};

use crate::broker::{CameraDevice, VideoQuality};
use crate::transform::PhotoSize;

/// 从相册选取时的选项。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickMediaOptions {
    pub photo_size: PhotoSize,
    /// 未指定时使用配置中的默认质量
    pub compression_quality: Option<u8>,
}

/// 拍照选项。`directory` 必须是相对路径。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreCameraOptions {
    pub directory: String,
    pub name: Option<String>,
    pub default_camera: CameraDevice,
    pub save_to_album: bool,
    pub photo_size: PhotoSize,
    pub compression_quality: Option<u8>,
}

/// 录像选项。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoOptions {
    pub directory: String,
    pub name: Option<String>,
    /// 期望的最长录制时长（秒）
    pub desired_length: Option<u32>,
    pub quality: VideoQuality,
    pub default_camera: CameraDevice,
    pub save_to_album: bool,
}
