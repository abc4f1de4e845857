use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::resolver::ResolvedMedia;

/// 交给调用方的媒体文件。
///
/// 读取流按需打开。释放（`dispose` 或 drop）时只删除临时副本，
/// 调用方自己的文件和拍摄输出永远不会被删。释放可重复调用，删除失败只记日志。
#[derive(Debug)]
pub struct MediaFile {
    media: ResolvedMedia,
    disposed: AtomicBool,
}

impl MediaFile {
    pub(crate) fn new(media: ResolvedMedia) -> Self {
        Self {
            media,
            disposed: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.media.path
    }

    pub fn is_temporary_copy(&self) -> bool {
        self.media.is_temporary_copy
    }

    /// 打开一个新的只读流。
    pub fn open(&self) -> io::Result<File> {
        File::open(&self.media.path)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// 释放文件：临时副本会被删除。
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if !self.media.is_temporary_copy {
            return;
        }

        match fs::remove_file(&self.media.path) {
            Ok(()) => log::debug!("🧹 已删除临时副本 - 路径: {}", self.media.path.display()),
            Err(err) => log::debug!(
                "删除临时副本失败（忽略） - 路径: {} 原因: {}",
                self.media.path.display(),
                err
            ),
        }
    }

    /// 放弃自动清理，把文件留给调用方，返回其路径。
    pub fn persist(mut self) -> PathBuf {
        self.disposed.store(true, Ordering::Release);
        std::mem::take(&mut self.media.path)
    }
}

impl Drop for MediaFile {
    fn drop(&mut self) {
        self.dispose();
    }
}
