//! 核心服务模块
//!
//! - 拉取端点客户端
//! - 文件树存储（快照整体替换）
//! - 内容缓存（事件驱动失效）
//! - 活动日志（单调时钟时间戳）
//! - 预览渲染（资源重写 + 沙箱准备）

mod activity_log;
mod api_client;
mod content_cache;
mod file_tree_store;
mod preview;

pub use activity_log::ActivityLog;
pub use api_client::ApiClient;
pub use content_cache::ContentCache;
pub use file_tree_store::FileTreeStore;
pub use preview::{PreviewDocument, PreviewRenderer, PreviewTheme, SANDBOX_TOKENS};
