//! 会话状态机
//!
//! Idle --start--> Generating --completed--> Completed；
//! Generating 遇到 status:error / 连接错误 / 通道错误进入 Error。
//! Completed 与 Error 为终态，只有再次 start_session 可以离开。

use serde::{Deserialize, Serialize};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Generating,
    Completed,
    Error,
}

impl SessionStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Error)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Generating => write!(f, "generating"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}
