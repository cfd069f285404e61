//! AI 项目生成工作台 —— 客户端会话核心
//!
//! 负责单次生成会话的完整生命周期：
//! - 推送通道（websocket）事件的有序消费
//! - 推送 / 拉取两条真相来源的对账（纪元守卫丢弃过期结果）
//! - 内存文件树（快照整体替换）与内容缓存（事件驱动失效）
//! - 终态状态机与不可信 HTML 的沙箱化预览准备

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use config::StudioConfig;
pub use error::StudioError;
pub use models::{
    ActivityEntry, ActivityKind, FileEventData, FileKind, FileNode, GenerateRequest, ServerEvent,
    StatusValue,
};
pub use services::{
    ActivityLog, ApiClient, ContentCache, FileTreeStore, PreviewDocument, PreviewRenderer,
    PreviewTheme, SANDBOX_TOKENS,
};
pub use session::{SessionCoordinator, SessionInfo, SessionStatus};
