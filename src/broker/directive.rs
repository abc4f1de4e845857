//! # 选择器启动边界
//!
//! broker 只负责把 `LaunchDirective` 交给 `PickerSurface`，界面如何弹出、
//! 相机应用如何被拉起都不在本 crate 的范围内。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::CorrelationId;

/// 选择器动作：从相册选取或调用相机拍摄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerAction {
    Pick,
    Capture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraDevice {
    #[default]
    Rear,
    Front,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    Low,
    Medium,
    #[default]
    High,
}

/// 随指令一起下发的提示信息，界面可以忽略其中任意一项。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaunchOptions {
    pub target_directory_hint: Option<String>,
    pub display_name_hint: Option<String>,
    pub camera_facing: Option<CameraDevice>,
    pub max_duration_seconds: Option<u32>,
    pub video_quality: Option<VideoQuality>,
    pub save_to_public_album: Option<bool>,
    /// 拍摄时预留的输出路径，相机应把结果写到这里
    pub target_path: Option<PathBuf>,
    pub allow_multiple: bool,
}

/// 下发给选择器界面的完整指令。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchDirective {
    pub correlation_id: CorrelationId,
    pub media_type_filter: String,
    pub action: PickerAction,
    pub options: LaunchOptions,
}

/// 选择器界面端口。
///
/// `launch` 只负责把界面拉起来，结果通过 [`super::EventSink`] 异步送回，
/// 可能来自任意线程，也可能在 `launch` 返回之前就已送达。
pub trait PickerSurface: Send + Sync {
    /// 拉起界面。返回 `Err` 表示界面根本没有启动。
    fn launch(&self, directive: LaunchDirective) -> Result<(), String>;

    /// 设备上是否有可用的相机。
    fn camera_available(&self) -> bool {
        true
    }
}
