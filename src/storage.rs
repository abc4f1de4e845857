//! 媒体存储目录管理模块
//!
//! # 设计思路
//!
//! 统一管理拍摄输出与临时副本的落盘位置和命名规则：
//! - 私有目录：`<media_root>/<Pictures|Movies>/<子目录>`，首次创建时写入 `.nomedia`，
//!   避免被相册应用扫描到。
//! - 公共相册：`<public_album_root>/<Pictures|Movies>/<子目录>`，不写 `.nomedia`。
//!
//! # 实现思路
//!
//! - 未给出文件名时按时间戳生成 `IMG_yyyyMMdd_HHmmss.jpg` / `VID_yyyyMMdd_HHmmss.mp4`。
//! - 同名文件存在时依次追加 `_1`、`_2` … 直到不冲突。
//! - 目录不存在时自动 `create_dir_all`，所有失败均返回 `Result`。

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::MediaConfig;
use crate::error::MediaError;

const NO_MEDIA_MARKER: &str = ".nomedia";
const CREATE_UNIQUE_MAX_ATTEMPTS: usize = 16;

/// 媒体类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub fn mime_filter(self) -> &'static str {
        match self {
            Self::Photo => "image/*",
            Self::Video => "video/*",
        }
    }

    pub fn default_extension(self) -> &'static str {
        match self {
            Self::Photo => ".jpg",
            Self::Video => ".mp4",
        }
    }

    fn file_prefix(self) -> &'static str {
        match self {
            Self::Photo => "IMG_",
            Self::Video => "VID_",
        }
    }

    fn directory_name(self) -> &'static str {
        match self {
            Self::Photo => "Pictures",
            Self::Video => "Movies",
        }
    }
}

/// 按时间戳生成默认文件名。
pub fn default_file_name(kind: MediaKind, now: DateTime<Local>) -> String {
    format!(
        "{}{}{}",
        kind.file_prefix(),
        now.format("%Y%m%d_%H%M%S"),
        kind.default_extension()
    )
}

/// 在 `folder` 中为 `name` 找到一个未被占用的路径。
///
/// 缺少扩展名时按媒体类型补全；冲突时追加递增数字后缀。
/// `name` 中取不出文件名（如 `..`、`/`）时改用默认文件名。
pub fn unique_path(folder: &Path, name: &str, kind: MediaKind) -> PathBuf {
    let file_name = match Path::new(name).file_stem() {
        Some(stem) if !stem.is_empty() => Path::new(name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        _ => default_file_name(kind, Local::now()),
    };
    let as_path = Path::new(&file_name);

    let ext = match as_path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => kind.default_extension().to_string(),
    };
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut candidate = folder.join(format!("{stem}{ext}"));
    let mut suffix = 1u64;
    while candidate.exists() {
        candidate = folder.join(format!("{stem}_{suffix}{ext}"));
        suffix += 1;
    }
    candidate
}

/// 调用方给出的目录必须是相对路径，且不能跳出媒体根目录。
pub fn validate_relative_directory(directory: &str) -> Result<(), MediaError> {
    let path = Path::new(directory);
    if path.is_absolute() || path.has_root() {
        return Err(MediaError::InvalidOptions(format!(
            "directory 必须是相对路径: {}",
            directory
        )));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(MediaError::InvalidOptions(format!(
            "directory 不能包含 '..': {}",
            directory
        )));
    }
    Ok(())
}

/// 媒体目录与输出路径分配器。
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    public_root: Option<PathBuf>,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, public_root: Option<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_root,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.media_root.clone(), config.public_album_root.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 获取（必要时创建）某类媒体的目录。
    ///
    /// # 返回
    /// - `Ok(PathBuf)` — 可用目录
    /// - `Err(MediaError::Storage)` — 公共相册未配置或目录创建失败
    pub fn media_dir(
        &self,
        kind: MediaKind,
        subdir: &str,
        save_to_album: bool,
    ) -> Result<PathBuf, MediaError> {
        validate_relative_directory(subdir)?;

        let base = if save_to_album {
            self.public_root
                .as_ref()
                .ok_or_else(|| MediaError::Storage("未配置公共相册目录".to_string()))?
        } else {
            &self.root
        };

        let dir = base.join(kind.directory_name()).join(subdir);
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                MediaError::Storage(format!("创建媒体目录 '{}' 失败: {}", dir.display(), e))
            })?;

            if !save_to_album {
                if let Err(err) = File::create(dir.join(NO_MEDIA_MARKER)) {
                    log::warn!("写入 .nomedia 失败 - 目录: {} 原因: {}", dir.display(), err);
                }
            }
        }
        Ok(dir)
    }

    /// 预留一个输出路径（不创建文件）。
    pub fn output_path(
        &self,
        kind: MediaKind,
        subdir: &str,
        name: Option<&str>,
        save_to_album: bool,
    ) -> Result<PathBuf, MediaError> {
        let dir = self.media_dir(kind, subdir, save_to_album)?;
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_file_name(kind, Local::now()),
        };
        Ok(unique_path(&dir, &name, kind))
    }

    /// 在私有目录中创建一个全新的文件，返回路径与可写句柄。
    ///
    /// 使用 `create_new` 占位，避免与并发落盘的同名文件互相覆盖。
    pub fn create_unique_file(
        &self,
        kind: MediaKind,
        subdir: &str,
    ) -> Result<(PathBuf, File), MediaError> {
        for _ in 0..CREATE_UNIQUE_MAX_ATTEMPTS {
            let path = self.output_path(kind, subdir, None, false)?;
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(MediaError::Storage(format!(
            "连续 {} 次未能分配唯一文件名",
            CREATE_UNIQUE_MAX_ATTEMPTS
        )))
    }
}
