//! 会话模块
//!
//! 提供以下功能：
//! - 推送通道句柄的获取与保证释放
//! - 终态状态机（Idle / Generating / Completed / Error）
//! - 会话协调器（事件有序消费、纪元守卫、推拉对账）

mod channel;
mod coordinator;
mod status;

pub use channel::PushChannel;
pub use coordinator::{SessionCoordinator, SessionInfo};
pub use status::SessionStatus;
