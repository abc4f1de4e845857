//! # 媒体桥接 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │             宿主应用 / 平台选择器界面（黑盒）               │
//! │                                                          │
//! │   PickerSurface::launch ◀── LaunchDirective              │
//! │   EventSink::deliver    ──▶ PickerEvent{id, outcome}     │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ Result<T, MediaError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            媒体桥接 (Rust)                        │
//! │                                                          │
//! │  ┌─ media ─────── MediaService (pick/take photo·video)   │
//! │  │                                                       │
//! │  ├─ broker ────── 单槽请求信箱 + 关联 ID                  │
//! │  │                                                       │
//! │  ├─ resolver ──── 引用 → 本地文件（必要时复制）           │
//! │  │                                                       │
//! │  ├─ transform ─── EXIF 方向 · 旋转 · 缩放 · JPEG 回写     │
//! │  ├─ storage       媒体目录 · 命名 · .nomedia             │
//! │  ├─ config        JSON 配置持久化                        │
//! │  └─ error         统一错误类型 MediaError                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `MediaError`，所有异步入口的返回类型 |
//! | [`config`] | 运行配置 `MediaConfig` 的默认值与 JSON 读写 |
//! | [`storage`] | 私有目录/公共相册的创建、默认命名与去重 |
//! | [`transform`] | 单个图片文件的方向校正、缩放与原地覆盖 |
//! | [`resolver`] | 把不透明引用落地为本地路径，必要时复制为临时副本 |
//! | [`broker`] | 单个在途请求的安装、事件匹配与结果投递 |
//! | [`media`] | 面向调用方的 `MediaService` 与 `MediaFile` |

pub mod broker;
pub mod config;
pub mod error;
pub mod media;
pub mod resolver;
pub mod storage;
pub mod transform;

pub use broker::{EventSink, PickerEvent, PickerOutcome, PickerSurface};
pub use config::MediaConfig;
pub use error::MediaError;
pub use media::{MediaFile, MediaService, PickMediaOptions, StoreCameraOptions, VideoOptions};
pub use resolver::{ContentLocator, ContentSource};
pub use transform::PhotoSize;
