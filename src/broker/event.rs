use serde::{Deserialize, Serialize};

use super::CorrelationId;
use crate::resolver::ContentLocator;

/// 选择器的最终结果。取消不是错误。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum PickerOutcome {
    Success(Vec<ContentLocator>),
    Canceled,
    Failed(String),
}

/// 平台回调事件：关联 ID + 结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerEvent {
    pub correlation_id: CorrelationId,
    pub outcome: PickerOutcome,
}

impl PickerEvent {
    pub fn new(correlation_id: CorrelationId, outcome: PickerOutcome) -> Self {
        Self {
            correlation_id,
            outcome,
        }
    }

    pub fn success(correlation_id: CorrelationId, locators: Vec<ContentLocator>) -> Self {
        Self::new(correlation_id, PickerOutcome::Success(locators))
    }

    pub fn canceled(correlation_id: CorrelationId) -> Self {
        Self::new(correlation_id, PickerOutcome::Canceled)
    }

    pub fn failed(correlation_id: CorrelationId, cause: impl Into<String>) -> Self {
        Self::new(correlation_id, PickerOutcome::Failed(cause.into()))
    }
}
