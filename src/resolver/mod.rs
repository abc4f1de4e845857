//! # 资源解析模块（resolver）
//!
//! ## 设计思路
//!
//! 把选择器交回的不透明引用落地为本地文件路径，一进一出、保持顺序：
//! - 本地路径：原样透传，`is_temporary_copy = false`
//! - 间接句柄：先向内容来源查询关联路径，可用则透传；
//!   否则把字节流复制到私有媒体目录下的新文件，`is_temporary_copy = true`
//! - 内容打不开：该位置输出 `None`，由服务层整体判定为 `MediaNotFound`
//!
//! ## 实现思路
//!
//! - 全部是阻塞 I/O，由服务层放进 `spawn_blocking`。
//! - 只会创建自己的新文件；唯一的删除发生在拍摄结果的“移动”语义里。
//! - 复制失败时删除半成品文件，不留下残缺副本。

mod locator;
mod source;

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::storage::{MediaKind, MediaStorage};

pub use locator::ContentLocator;
pub use source::{ContentSource, FsContentSource};

/// 临时副本所在的子目录。
const TEMP_SUBDIR: &str = "temp";

/// 解析结果：本地路径与是否为临时副本。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub path: PathBuf,
    pub is_temporary_copy: bool,
}

pub struct AssetResolver {
    source: Arc<dyn ContentSource>,
    storage: MediaStorage,
}

impl AssetResolver {
    pub fn new(source: Arc<dyn ContentSource>, storage: MediaStorage) -> Self {
        Self { source, storage }
    }

    pub fn storage(&self) -> &MediaStorage {
        &self.storage
    }

    /// 逐个解析引用，输出与输入一一对应。
    pub fn resolve(
        &self,
        locators: &[ContentLocator],
        kind: MediaKind,
    ) -> Vec<Option<ResolvedMedia>> {
        let start = Instant::now();
        let resolved: Vec<Option<ResolvedMedia>> = locators
            .iter()
            .map(|locator| self.resolve_one(locator, kind))
            .collect();

        log::info!(
            "📁 解析完成 - 数量: {} 失败: {} 临时副本: {} elapsed={}ms",
            resolved.len(),
            resolved.iter().filter(|r| r.is_none()).count(),
            resolved
                .iter()
                .flatten()
                .filter(|r| r.is_temporary_copy)
                .count(),
            start.elapsed().as_millis()
        );

        resolved
    }

    fn resolve_one(&self, locator: &ContentLocator, kind: MediaKind) -> Option<ResolvedMedia> {
        if let Some(path) = locator.as_local_path() {
            if path.is_file() {
                return Some(ResolvedMedia {
                    path,
                    is_temporary_copy: false,
                });
            }
            log::warn!("本地文件不存在 - 引用: {}", locator);
            return None;
        }

        if let Some(path) = self.source.query_local_path(locator) {
            if Self::is_usable_path(&path) {
                log::debug!("间接句柄关联到本地路径 - 引用: {} 路径: {}", locator, path.display());
                return Some(ResolvedMedia {
                    path,
                    is_temporary_copy: false,
                });
            }
        }

        self.copy_to_temp(locator, kind)
    }

    fn is_usable_path(path: &Path) -> bool {
        path.is_absolute() && path.is_file()
    }

    /// 把内容流复制到私有目录下的新文件。
    fn copy_to_temp(&self, locator: &ContentLocator, kind: MediaKind) -> Option<ResolvedMedia> {
        let mut input = match self.source.open_read_stream(locator) {
            Ok(stream) => stream,
            Err(err) => {
                log::warn!("无法打开内容流 - 引用: {} 原因: {}", locator, err);
                return None;
            }
        };

        let (path, mut output) = match self.storage.create_unique_file(kind, TEMP_SUBDIR) {
            Ok(created) => created,
            Err(err) => {
                log::error!("创建临时副本失败 - 引用: {} 原因: {}", locator, err);
                return None;
            }
        };

        match io::copy(&mut input, &mut output) {
            Ok(bytes) => {
                log::debug!(
                    "📝 已复制内容 - 引用: {} 目标: {} 大小: {} 字节",
                    locator,
                    path.display(),
                    bytes
                );
                Some(ResolvedMedia {
                    path,
                    is_temporary_copy: true,
                })
            }
            Err(err) => {
                log::warn!("复制内容失败 - 引用: {} 原因: {}", locator, err);
                drop(output);
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    /// 采纳拍摄结果：把平台返回的文件落到预留路径上。
    ///
    /// - 平台没有返回引用，或返回的就是预留路径：直接使用预留路径
    /// - 返回了别的引用：解析后移动到预留路径，并删除原内容
    ///
    /// 预留路径最终不存在时返回 `None`。
    pub fn adopt_capture(
        &self,
        returned: Option<&ContentLocator>,
        target: &Path,
        kind: MediaKind,
    ) -> Option<PathBuf> {
        let adopted = match returned {
            Some(locator) if locator.as_local_path().as_deref() != Some(target) => {
                self.move_into(locator, target, kind)
            }
            _ => true,
        };

        if adopted && target.is_file() {
            Some(target.to_path_buf())
        } else {
            None
        }
    }

    fn move_into(&self, locator: &ContentLocator, target: &Path, kind: MediaKind) -> bool {
        let Some(resolved) = self.resolve_one(locator, kind) else {
            return false;
        };

        if resolved.path == target {
            return true;
        }

        if let Err(err) = fs::remove_file(target) {
            if err.kind() != ErrorKind::NotFound {
                log::debug!("清理预留路径失败 - 路径: {} 原因: {}", target.display(), err);
            }
        }

        if let Err(err) = Self::move_file(&resolved.path, target) {
            log::warn!(
                "移动拍摄结果失败 - 来源: {} 目标: {} 原因: {}",
                resolved.path.display(),
                target.display(),
                err
            );
            if resolved.is_temporary_copy {
                let _ = fs::remove_file(&resolved.path);
            }
            return false;
        }

        if locator.is_content_handle() {
            if let Err(err) = self.source.delete(locator) {
                log::debug!("删除原内容失败（忽略） - 引用: {} 原因: {}", locator, err);
            }
        }

        true
    }

    fn move_file(from: &Path, to: &Path) -> io::Result<()> {
        if fs::rename(from, to).is_ok() {
            return Ok(());
        }

        // 跨设备时 rename 会失败，退化为复制后删除
        fs::copy(from, to)?;
        if let Err(err) = fs::remove_file(from) {
            log::debug!("删除移动源失败（忽略） - 路径: {} 原因: {}", from.display(), err);
        }
        Ok(())
    }
}
