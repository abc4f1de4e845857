//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageTransformer` 只负责流程编排与配置管理，不知道请求与关联 ID。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 读取方向信息
//! 3. 判断是否需要重写（0° 且 `Full` 时直接返回 `false`）
//! 4. 解码、旋转、缩放、编码、回写
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<TransformConfig>>` 支持运行时切换缩放档位。
//! - 单次调用内使用同一配置快照，避免处理中途配置漂移。
//! - 所有方法都是阻塞的，由服务层放到 `spawn_blocking` 中执行。

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::orientation::{self, Rotation};
use super::{PhotoSize, ScalingProfile, TransformConfig, TransformError};

/// 图片归一化器。克隆后共享同一份配置。
#[derive(Clone)]
pub struct ImageTransformer {
    config: Arc<RwLock<TransformConfig>>,
}

impl ImageTransformer {
    pub fn new(config: TransformConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置快照。
    pub fn config_snapshot(&self) -> Result<TransformConfig, TransformError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| TransformError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 切换缩放档位。
    pub fn set_scaling_profile(&self, profile: ScalingProfile) -> Result<(), TransformError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| TransformError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.scaling_profile = profile;

        log::info!(
            "⚙️ 已切换缩放档位：{}（filter={:?}）",
            profile.as_str(),
            config.resize_filter()
        );

        Ok(())
    }

    pub fn scaling_profile(&self) -> Result<ScalingProfile, TransformError> {
        Ok(self.config_snapshot()?.scaling_profile)
    }

    /// 校正方向并按档位缩放，原地覆盖文件。
    ///
    /// 返回 `true` 表示文件被重写。方向读取失败按 0° 处理。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use std::path::Path;
    /// use media_bridge::transform::{ImageTransformer, PhotoSize, TransformConfig};
    ///
    /// let transformer = ImageTransformer::new(TransformConfig::default());
    /// let _rewritten = transformer.normalize(Path::new("/tmp/IMG_0001.jpg"), PhotoSize::Medium, 80)?;
    /// # Ok::<(), media_bridge::transform::TransformError>(())
    /// ```
    pub fn normalize(
        &self,
        path: &Path,
        size: PhotoSize,
        quality: u8,
    ) -> Result<bool, TransformError> {
        if path.as_os_str().is_empty() {
            return Ok(false);
        }

        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let rotation = orientation::read_rotation(path);
        if rotation.is_none() && size.is_full() {
            log::debug!("无需重写 - 路径: {}", path.display());
            return Ok(false);
        }

        self.rewrite_file(path, rotation, size, quality, &config)?;

        log::info!(
            "✅ 归一化完成 - 旋转: {}° 档位: {} total={}ms",
            rotation.degrees(),
            size,
            total_start.elapsed().as_millis()
        );

        Ok(true)
    }

    /// 只缩放、不读取方向。`Full` 时直接返回 `false`。
    pub fn resize(
        &self,
        path: &Path,
        size: PhotoSize,
        quality: u8,
    ) -> Result<bool, TransformError> {
        if path.as_os_str().is_empty() || size.is_full() {
            return Ok(false);
        }

        let config = self.config_snapshot()?;
        let start = Instant::now();
        self.rewrite_file(path, Rotation::None, size, quality, &config)?;

        log::info!(
            "✅ 缩放完成 - 档位: {} total={}ms",
            size,
            start.elapsed().as_millis()
        );

        Ok(true)
    }

    /// 读取当前文件的像素尺寸（仅解析头部）。
    pub fn dimensions(&self, path: &Path) -> Result<(u32, u32), TransformError> {
        Self::inspect_dimensions(path)
    }
}
