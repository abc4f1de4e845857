//! # 内容来源边界
//!
//! 平台内容提供方（相册、文件选择器）在这里被抽象为 `ContentSource`。
//! 解析器只通过这三个操作访问它，不关心背后是哪种存储。

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use super::ContentLocator;

/// 内容来源端口。实现必须线程安全，解析在后台线程执行。
pub trait ContentSource: Send + Sync {
    /// 查询间接句柄关联的本地路径。没有关联路径时返回 `None`。
    fn query_local_path(&self, locator: &ContentLocator) -> Option<PathBuf>;

    /// 打开内容的字节流。内容不可用时返回 `NotFound`。
    fn open_read_stream(&self, locator: &ContentLocator) -> io::Result<Box<dyn Read + Send>>;

    /// 删除来源中的内容（仅在“移动”语义下调用）。
    fn delete(&self, locator: &ContentLocator) -> io::Result<()>;
}

/// 只认识本地路径与 `file://` URI 的来源，供命令行与桌面环境使用。
#[derive(Debug, Default, Clone, Copy)]
pub struct FsContentSource;

impl ContentSource for FsContentSource {
    fn query_local_path(&self, locator: &ContentLocator) -> Option<PathBuf> {
        locator.as_local_path()
    }

    fn open_read_stream(&self, locator: &ContentLocator) -> io::Result<Box<dyn Read + Send>> {
        let path = locator.as_local_path().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("无法打开内容：{}", locator))
        })?;
        Ok(Box::new(File::open(path)?))
    }

    fn delete(&self, locator: &ContentLocator) -> io::Result<()> {
        match locator.as_local_path() {
            Some(path) => std::fs::remove_file(path),
            None => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("不支持删除该内容：{}", locator),
            )),
        }
    }
}
