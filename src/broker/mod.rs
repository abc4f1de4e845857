//! # 请求调度模块（broker）
//!
//! ## 设计思路
//!
//! 平台回调是“带 ID、只触发一次、可能永远不来”的异步事件。这里把它收敛成
//! 一个单槽信箱：
//!
//! ```text
//! launch ──▶ [slot: Option<PendingRequest{id, sender}>] ◀── EventSink::deliver
//!    │                                                          │
//!    └──────────── PendingPick (oneshot receiver) ◀─────────────┘
//! ```
//!
//! - 同一时间最多一个在途请求，第二个请求立即失败，不排队、不替换。
//! - 事件 ID 与槽中 ID 不一致时直接忽略；一致时取出槽位并发送结果，
//!   重复事件因为槽位已空而自然成为空操作。
//!
//! ## 实现思路
//!
//! - 安装与“匹配并清空”各自是一次 `Mutex` 保护下的检查并设置。
//! - 调用界面前释放锁：界面可能在 `launch` 返回前就同步送回结果。
//! - 没有内部超时，也没有调用方主动取消。

mod directive;
mod event;
mod id;

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::MediaError;
use crate::storage::MediaKind;

pub use directive::{
    CameraDevice, LaunchDirective, LaunchOptions, PickerAction, PickerSurface, VideoQuality,
};
pub use event::{PickerEvent, PickerOutcome};
pub use id::CorrelationId;

struct PendingRequest {
    id: CorrelationId,
    sender: oneshot::Sender<PickerOutcome>,
}

struct SlotState {
    next_id: CorrelationId,
    current: Option<PendingRequest>,
}

struct BrokerShared {
    slot: Mutex<SlotState>,
}

impl BrokerShared {
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.slot.lock().unwrap_or_else(|poisoned| {
            log::warn!("请求槽锁已中毒，继续使用内部状态");
            poisoned.into_inner()
        })
    }

    /// 槽中仍是 `id` 时取出；否则保持不变。
    fn take_if(&self, id: CorrelationId) -> Option<PendingRequest> {
        let mut state = self.lock();
        match &state.current {
            Some(pending) if pending.id == id => state.current.take(),
            _ => None,
        }
    }
}

/// 单槽请求调度器。
pub struct RequestBroker {
    surface: Arc<dyn PickerSurface>,
    shared: Arc<BrokerShared>,
}

impl RequestBroker {
    pub fn new(surface: Arc<dyn PickerSurface>) -> Self {
        Self {
            surface,
            shared: Arc::new(BrokerShared {
                slot: Mutex::new(SlotState {
                    next_id: CorrelationId::FIRST,
                    current: None,
                }),
            }),
        }
    }

    /// 平台回调入口，可以克隆后交给任意线程。
    pub fn event_sink(&self) -> EventSink {
        EventSink {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn surface(&self) -> &Arc<dyn PickerSurface> {
        &self.surface
    }

    /// 当前是否有在途请求。
    pub fn is_pending(&self) -> bool {
        self.shared.lock().current.is_some()
    }

    /// 安装新请求并拉起界面。
    ///
    /// # 返回
    /// - `Ok(PendingPick)` — 等待平台结果的句柄
    /// - `Err(MediaError::ConcurrentRequest)` — 已有在途请求
    /// - `Err(MediaError::PlatformReported)` — 界面没能启动，槽位已清空
    pub fn launch(
        &self,
        kind: MediaKind,
        action: PickerAction,
        options: LaunchOptions,
    ) -> Result<PendingPick, MediaError> {
        let (sender, receiver) = oneshot::channel();

        let id = {
            let mut state = self.shared.lock();
            if state.current.is_some() {
                log::warn!("⛔ 拒绝新请求：已有请求在途");
                return Err(MediaError::ConcurrentRequest);
            }
            let id = state.next_id;
            state.next_id = id.following();
            state.current = Some(PendingRequest { id, sender });
            id
        };

        let directive = LaunchDirective {
            correlation_id: id,
            media_type_filter: kind.mime_filter().to_string(),
            action,
            options,
        };
        log::info!(
            "🚀 拉起选择器 - ID: {} 类型: {} 动作: {:?}",
            id,
            directive.media_type_filter,
            action
        );

        if let Err(cause) = self.surface.launch(directive) {
            log::error!("选择器启动失败 - ID: {} 原因: {}", id, cause);
            self.shared.take_if(id);
            return Err(MediaError::PlatformReported(cause));
        }

        Ok(PendingPick { id, receiver })
    }
}

/// 平台结果投递端。
#[derive(Clone)]
pub struct EventSink {
    shared: Arc<BrokerShared>,
}

impl EventSink {
    /// 投递一条平台事件。
    ///
    /// 返回 `true` 表示事件匹配了在途请求并已送达；不匹配或重复的事件返回 `false`。
    pub fn deliver(&self, event: PickerEvent) -> bool {
        let Some(pending) = self.shared.take_if(event.correlation_id) else {
            log::debug!("忽略不匹配的事件 - ID: {}", event.correlation_id);
            return false;
        };

        log::debug!("📥 收到选择器结果 - ID: {}", pending.id);
        if pending.sender.send(event.outcome).is_err() {
            log::warn!("调用方已不再等待结果 - ID: {}", pending.id);
        }
        true
    }
}

/// 等待平台结果的句柄。
#[derive(Debug)]
pub struct PendingPick {
    id: CorrelationId,
    receiver: oneshot::Receiver<PickerOutcome>,
}

impl PendingPick {
    pub fn id(&self) -> CorrelationId {
        self.id
    }
}

impl Future for PendingPick {
    type Output = PickerOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|received| {
            received.unwrap_or_else(|_| PickerOutcome::Failed("结果通道已关闭".to_string()))
        })
    }
}
