//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 图片归一化链路（读取方向 → 解码 → 旋转/缩放 → 编码 → 回写）中的所有失败
//! 统一收敛到 `TransformError`，调用侧可以按分支匹配，也可以直接记录日志后吞掉。

/// 图片归一化统一错误类型。
///
/// 在服务层会被上转为 `MediaError::Transform`。
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("缩放错误：{0}")]
    Scale(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("参数错误：{0}")]
    InvalidOption(String),
}

impl TransformError {
    /// 失败发生的阶段，用于日志与诊断。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode(_) | Self::ResourceLimit(_) => "decode",
            Self::Scale(_) => "scale",
            Self::Encode(_) => "encode",
            Self::FileSystem(_) => "write",
            Self::InvalidOption(_) => "options",
        }
    }
}
