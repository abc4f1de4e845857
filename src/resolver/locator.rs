use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

const FILE_SCHEME: &str = "file://";
const CONTENT_SCHEME: &str = "content://";

/// 平台交回的媒体引用，只读、不透明。
///
/// 可能是本地路径、`file://` URI，或 `content://` 之类的间接句柄。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentLocator(String);

impl ContentLocator {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self(path.into().to_string_lossy().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 若引用直接指向本地文件，返回该路径。
    pub fn as_local_path(&self) -> Option<PathBuf> {
        if self.0.starts_with(FILE_SCHEME) {
            return Url::parse(&self.0).ok()?.to_file_path().ok();
        }
        if self.0.contains("://") {
            return None;
        }
        let path = PathBuf::from(&self.0);
        if path.is_absolute() {
            Some(path)
        } else {
            None
        }
    }

    pub fn is_content_handle(&self) -> bool {
        self.0.starts_with(CONTENT_SCHEME)
    }
}

impl fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
