//! 活动日志模型

use serde::{Deserialize, Serialize};

/// 活动条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Log,
    FileCreate,
    FileUpdate,
    FileDelete,
    Error,
}

/// 活动条目
///
/// 时间戳为距会话开始的毫秒数，取自客户端单调时钟，
/// 与服务端时间无关。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// 条目类型
    pub kind: ActivityKind,
    /// 人类可读消息
    pub message: String,
    /// 距会话开始的毫秒数
    pub elapsed_ms: u64,
    /// 结构化负载
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}
