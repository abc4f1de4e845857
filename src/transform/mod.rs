//! # 图片归一化模块（transform）
//!
//! ## 设计思路
//!
//! 叶子组件：对单个图片文件执行“读方向 → 解码 → 旋转 → 缩放 → 编码 → 原地覆盖”，
//! 不感知请求、关联 ID 或来源。
//!
//! - `handler`：编排入口（`normalize` / `resize`）与配置状态
//! - `orientation`：EXIF 方向读取
//! - `pipeline`：解码、旋转、缩放、编码、回写
//! - `config/error/size`：配置、错误、尺寸档位
//!
//! ## 调用链
//!
//! ```text
//! MediaService（spawn_blocking）
//!    ↓
//! handler.rs（快照配置 + 判断是否需要重写）
//!    ├─ orientation.rs（EXIF → 0/90/180/270）
//!    └─ pipeline.rs（decode → rotate → scale → encode → overwrite）
//! ```

mod config;
mod error;
mod handler;
mod orientation;
mod pipeline;
mod size;

#[cfg(test)]
pub(crate) mod test_images;

pub use config::{ScalingProfile, TransformConfig};
pub use error::TransformError;
pub use handler::ImageTransformer;
pub use orientation::{read_rotation, Rotation};
pub use size::PhotoSize;
