//! 推送通道句柄
//!
//! 每个会话持有一条通道。句柄被替换或随协调器销毁时保证释放
//! （取消令牌 + 任务中止），不做自动重连——重连会让同一提示词
//! 触发重复的生成运行。

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 推送通道句柄
///
/// 持有消费任务的取消令牌与句柄；通道本体（websocket 流）
/// 归消费任务所有，任务结束即关闭连接。
pub struct PushChannel {
    cancel: CancellationToken,
    consumer: JoinHandle<()>,
}

impl PushChannel {
    pub(crate) fn new(cancel: CancellationToken, consumer: JoinHandle<()>) -> Self {
        Self { cancel, consumer }
    }

    /// 关闭通道：取消并中止消费任务
    pub fn close(&self) {
        self.cancel.cancel();
        self.consumer.abort();
    }

    /// 消费任务是否已结束（终态或通道断开后为 true）
    pub fn is_finished(&self) -> bool {
        self.consumer.is_finished()
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        self.close();
    }
}
