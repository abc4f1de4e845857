//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `MediaError` 枚举，调用方的每个异步入口都返回
//! `Result<T, MediaError>`。取消不是错误：取消以空结果返回，不会出现在这里。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `TransformError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，方便跨 IPC 边界传递。

use serde::Serialize;

use crate::transform::TransformError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// 已有一个请求在途，新请求被立即拒绝（不排队、不替换）
    #[error("同一时间只能有一个媒体请求在进行")]
    ConcurrentRequest,

    /// 存储权限未授予，调用方需要重新申请
    #[error("未获得存储权限")]
    PermissionDenied,

    /// 无法把选择结果落地为本地文件
    #[error("媒体文件不存在: {0}")]
    MediaNotFound(String),

    /// 选择器界面报告的失败，原样透传
    #[error("选择器报告错误: {0}")]
    PlatformReported(String),

    /// 图片归一化失败（调用点通常记录日志后吞掉）
    #[error("{0}")]
    Transform(#[from] TransformError),

    /// 调用参数不合法
    #[error("参数不合法: {0}")]
    InvalidOptions(String),

    /// 媒体目录不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 后台阻塞任务异常退出
    #[error("后台任务失败: {0}")]
    Worker(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// 稳定的错误码，供前端或日志聚合使用。
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConcurrentRequest => "E_CONCURRENT_REQUEST",
            Self::PermissionDenied => "E_PERMISSION_DENIED",
            Self::MediaNotFound(_) => "E_MEDIA_NOT_FOUND",
            Self::PlatformReported(_) => "E_PLATFORM",
            Self::Transform(_) => "E_TRANSFORM",
            Self::InvalidOptions(_) => "E_INVALID_OPTIONS",
            Self::Storage(_) => "E_STORAGE",
            Self::Worker(_) => "E_WORKER",
            Self::Io(_) => "E_IO",
        }
    }
}

/// 跨 IPC 边界时将错误序列化为人类可读的字符串。
impl Serialize for MediaError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<tokio::task::JoinError> for MediaError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(err.to_string())
    }
}
