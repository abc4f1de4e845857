//! # 媒体服务模块（media）
//!
//! ## 设计思路
//!
//! 调用方唯一需要面对的入口。每个操作都是“一次异步调用 → 确定结果”：
//!
//! ```text
//! pick_photo / take_photo / pick_video / take_video
//!    │
//!    ├─ 权限检查 / 参数校验 / 预留输出路径
//!    ├─ RequestBroker::launch ──▶ 等待平台事件
//!    ├─ AssetResolver（spawn_blocking）
//!    └─ ImageTransformer（spawn_blocking，仅照片）
//! ```
//!
//! ## 实现思路
//!
//! - 取消返回空结果，平台错误原样透传为 `PlatformReported`。
//! - 任一引用无法落地时整体失败为 `MediaNotFound`，已生成的临时副本随之清理。
//! - 归一化失败只记日志，调用方拿到未处理的原文件。
//! - 调用方的 future 在所有后处理完成后才返回。

mod file;
mod options;
mod permission;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::broker::{
    EventSink, LaunchOptions, PickerAction, PickerOutcome, PickerSurface, RequestBroker,
};
use crate::config::MediaConfig;
use crate::error::MediaError;
use crate::resolver::{AssetResolver, ContentLocator, ContentSource, ResolvedMedia};
use crate::storage::{validate_relative_directory, MediaKind, MediaStorage};
use crate::transform::{ImageTransformer, PhotoSize};

pub use file::MediaFile;
pub use options::{PickMediaOptions, StoreCameraOptions, VideoOptions};
pub use permission::{AssumeGranted, PermissionGate, PermissionStatus};

/// 照片后处理参数：尺寸档位 + JPEG 质量。
#[derive(Debug, Clone, Copy)]
struct Normalization {
    size: PhotoSize,
    quality: u8,
}

pub struct MediaService {
    config: MediaConfig,
    broker: RequestBroker,
    resolver: Arc<AssetResolver>,
    transformer: ImageTransformer,
    permissions: Arc<dyn PermissionGate>,
}

impl MediaService {
    pub fn new(
        config: MediaConfig,
        surface: Arc<dyn PickerSurface>,
        content: Arc<dyn ContentSource>,
        permissions: Arc<dyn PermissionGate>,
    ) -> Self {
        let storage = MediaStorage::from_config(&config);
        log::info!("📁 媒体根目录: {}", storage.root().display());

        Self {
            transformer: ImageTransformer::new(config.transform.clone()),
            broker: RequestBroker::new(surface),
            resolver: Arc::new(AssetResolver::new(content, storage)),
            permissions,
            config,
        }
    }

    /// 平台回调入口。
    pub fn event_sink(&self) -> EventSink {
        self.broker.event_sink()
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub fn is_camera_available(&self) -> bool {
        self.broker.surface().camera_available()
    }

    pub fn is_take_photo_supported(&self) -> bool {
        true
    }

    pub fn is_pick_photo_supported(&self) -> bool {
        true
    }

    pub fn is_take_video_supported(&self) -> bool {
        true
    }

    pub fn is_pick_video_supported(&self) -> bool {
        true
    }

    // ------------------------------------------------------------------------
    // Caller API
    // ------------------------------------------------------------------------

    /// 从相册选取照片（可多选）。取消时返回空列表。
    pub async fn pick_photo(
        &self,
        options: PickMediaOptions,
    ) -> Result<Vec<MediaFile>, MediaError> {
        let normalization = Normalization {
            size: options.photo_size,
            quality: self.quality_or_default(options.compression_quality),
        };
        self.pick(MediaKind::Photo, Some(normalization)).await
    }

    /// 从相册选取视频（可多选）。视频不做任何转码。
    pub async fn pick_video(&self) -> Result<Vec<MediaFile>, MediaError> {
        self.pick(MediaKind::Video, None).await
    }

    /// 调用相机拍照。取消时返回 `None`。
    pub async fn take_photo(
        &self,
        options: StoreCameraOptions,
    ) -> Result<Option<MediaFile>, MediaError> {
        let launch = LaunchOptions {
            camera_facing: Some(options.default_camera),
            ..LaunchOptions::default()
        };
        let normalization = Normalization {
            size: options.photo_size,
            quality: self.quality_or_default(options.compression_quality),
        };

        let Some(file) = self
            .capture(
                MediaKind::Photo,
                &options.directory,
                options.name,
                options.save_to_album,
                launch,
            )
            .await?
        else {
            return Ok(None);
        };

        self.normalize_all(&[file.path().to_path_buf()], normalization).await;
        Ok(Some(file))
    }

    /// 调用相机录像。取消时返回 `None`。
    pub async fn take_video(&self, options: VideoOptions) -> Result<Option<MediaFile>, MediaError> {
        let launch = LaunchOptions {
            camera_facing: Some(options.default_camera),
            max_duration_seconds: options.desired_length,
            video_quality: Some(options.quality),
            ..LaunchOptions::default()
        };

        self.capture(
            MediaKind::Video,
            &options.directory,
            options.name,
            options.save_to_album,
            launch,
        )
        .await
    }

    /// 对任意本地图片执行方向校正与缩放。
    pub async fn normalize(
        &self,
        path: &Path,
        size: PhotoSize,
        quality: u8,
    ) -> Result<bool, MediaError> {
        let transformer = self.transformer.clone();
        let path = path.to_path_buf();
        let rewritten =
            tokio::task::spawn_blocking(move || transformer.normalize(&path, size, quality))
                .await??;
        Ok(rewritten)
    }

    /// 只缩放，不处理方向。
    pub async fn resize(
        &self,
        path: &Path,
        size: PhotoSize,
        quality: u8,
    ) -> Result<bool, MediaError> {
        let transformer = self.transformer.clone();
        let path = path.to_path_buf();
        let rewritten =
            tokio::task::spawn_blocking(move || transformer.resize(&path, size, quality)).await??;
        Ok(rewritten)
    }

    // ------------------------------------------------------------------------
    // Flows
    // ------------------------------------------------------------------------

    async fn pick(
        &self,
        kind: MediaKind,
        normalization: Option<Normalization>,
    ) -> Result<Vec<MediaFile>, MediaError> {
        self.ensure_storage_access()?;

        let launch = LaunchOptions {
            allow_multiple: true,
            ..LaunchOptions::default()
        };
        let pending = self.broker.launch(kind, PickerAction::Pick, launch)?;
        let id = pending.id();

        let locators = match pending.await {
            PickerOutcome::Success(locators) => locators,
            PickerOutcome::Canceled => {
                log::info!("选择已取消 - ID: {}", id);
                return Ok(Vec::new());
            }
            PickerOutcome::Failed(cause) => return Err(MediaError::PlatformReported(cause)),
        };
        let locators = self.limit_picked(locators);

        let total_start = Instant::now();
        let resolve_start = Instant::now();
        let files = self.resolve_all(locators, kind).await?;
        let resolve_ms = resolve_start.elapsed().as_millis();

        let normalize_start = Instant::now();
        if let Some(normalization) = normalization {
            let paths: Vec<PathBuf> = files.iter().map(|f| f.path().to_path_buf()).collect();
            self.normalize_all(&paths, normalization).await;
        }

        log::info!(
            "✅ 选择完成 - ID: {} 数量: {} resolve={}ms normalize={}ms total={}ms",
            id,
            files.len(),
            resolve_ms,
            normalize_start.elapsed().as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(files)
    }

    async fn capture(
        &self,
        kind: MediaKind,
        directory: &str,
        name: Option<String>,
        save_to_album: bool,
        mut launch: LaunchOptions,
    ) -> Result<Option<MediaFile>, MediaError> {
        validate_relative_directory(directory)?;

        let storage = self.resolver.storage().clone();
        let subdir = directory.to_string();
        let target = tokio::task::spawn_blocking(move || {
            storage.output_path(kind, &subdir, name.as_deref(), save_to_album)
        })
        .await??;

        launch.target_directory_hint = Some(directory.to_string());
        launch.display_name_hint = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        launch.save_to_public_album = Some(save_to_album);
        launch.target_path = Some(target.clone());

        let pending = self.broker.launch(kind, PickerAction::Capture, launch)?;
        let id = pending.id();

        let returned = match pending.await {
            PickerOutcome::Success(locators) => locators.into_iter().next(),
            PickerOutcome::Canceled => {
                log::info!("拍摄已取消 - ID: {}", id);
                Self::discard_reserved(&target);
                return Ok(None);
            }
            PickerOutcome::Failed(cause) => {
                Self::discard_reserved(&target);
                return Err(MediaError::PlatformReported(cause));
            }
        };

        let adopted = self.adopt_capture(returned, target.clone(), kind).await?;
        match adopted {
            Some(path) => {
                log::info!("✅ 拍摄完成 - ID: {} 路径: {}", id, path.display());
                Ok(Some(MediaFile::new(ResolvedMedia {
                    path,
                    is_temporary_copy: false,
                })))
            }
            None => Err(MediaError::MediaNotFound(target.display().to_string())),
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn ensure_storage_access(&self) -> Result<(), MediaError> {
        match self.permissions.ensure_storage_access() {
            PermissionStatus::Granted => Ok(()),
            PermissionStatus::Denied => {
                log::warn!("⛔ 未获得存储权限，不拉起选择器");
                Err(MediaError::PermissionDenied)
            }
        }
    }

    fn quality_or_default(&self, requested: Option<u8>) -> u8 {
        requested.unwrap_or(self.config.default_quality).min(100)
    }

    fn limit_picked(&self, mut locators: Vec<ContentLocator>) -> Vec<ContentLocator> {
        let limit = self.config.max_picked_items;
        if locators.len() > limit {
            log::warn!("选择数量超过上限，只保留前 {} 项（共 {} 项）", limit, locators.len());
            locators.truncate(limit);
        }
        locators
    }

    /// 解析全部引用；任意一项失败时整体失败，已有的临时副本随 `MediaFile` 一起清理。
    async fn resolve_all(
        &self,
        locators: Vec<ContentLocator>,
        kind: MediaKind,
    ) -> Result<Vec<MediaFile>, MediaError> {
        let resolver = Arc::clone(&self.resolver);
        let (locators, resolved) = tokio::task::spawn_blocking(move || {
            let resolved = resolver.resolve(&locators, kind);
            (locators, resolved)
        })
        .await?;

        let slots: Vec<Option<MediaFile>> = resolved
            .into_iter()
            .map(|slot| slot.map(MediaFile::new))
            .collect();

        if let Some(index) = slots.iter().position(Option::is_none) {
            let locator = locators
                .get(index)
                .map(ContentLocator::to_string)
                .unwrap_or_default();
            return Err(MediaError::MediaNotFound(locator));
        }

        Ok(slots.into_iter().flatten().collect())
    }

    async fn adopt_capture(
        &self,
        returned: Option<ContentLocator>,
        target: PathBuf,
        kind: MediaKind,
    ) -> Result<Option<PathBuf>, MediaError> {
        let resolver = Arc::clone(&self.resolver);
        let adopted = tokio::task::spawn_blocking(move || {
            resolver.adopt_capture(returned.as_ref(), &target, kind)
        })
        .await?;
        Ok(adopted)
    }

    /// 逐个归一化照片。失败只记日志，文件保持原样交给调用方。
    async fn normalize_all(&self, paths: &[PathBuf], normalization: Normalization) {
        let transformer = self.transformer.clone();
        let paths = paths.to_vec();

        let joined = tokio::task::spawn_blocking(move || {
            for path in &paths {
                match transformer.normalize(path, normalization.size, normalization.quality) {
                    Ok(true) => {}
                    Ok(false) => log::debug!("照片无需处理 - 路径: {}", path.display()),
                    Err(err) => log::warn!(
                        "照片归一化失败，返回原文件 - 路径: {} 阶段: {} 原因: {}",
                        path.display(),
                        err.stage(),
                        err
                    ),
                }
            }
        })
        .await;

        if let Err(err) = joined {
            log::warn!("归一化任务异常退出，返回原文件: {}", err);
        }
    }

    /// 相机在取消或失败时可能留下空文件，预留路径只属于本次请求，直接清理。
    fn discard_reserved(target: &Path) {
        if target.exists() {
            if let Err(err) = fs::remove_file(target) {
                log::debug!("清理预留路径失败（忽略） - 路径: {} 原因: {}", target.display(), err);
            }
        }
    }
}
