use std::fmt;

use serde::{Deserialize, Serialize};

/// 请求关联 ID。
///
/// 平台的请求码是有符号 32 位整数，所以 ID 只在 `0..=i32::MAX` 内递增，
/// 到顶后回绕到 0。只有 broker 会生成新 ID。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(i32);

impl CorrelationId {
    pub const FIRST: Self = Self(0);

    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// 下一个 ID，`i32::MAX` 之后回到 0。
    pub(crate) fn following(self) -> Self {
        if self.0 >= i32::MAX || self.0 < 0 {
            Self::FIRST
        } else {
            Self(self.0 + 1)
        }
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
