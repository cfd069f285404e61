//! 会话协调器
//!
//! 持有单次生成会话的完整生命周期：推送通道、终态状态机、
//! 活动日志、文件树与内容缓存。推送事件在唯一的消费任务中
//! 按到达顺序处理；所有异步拉取结果经由纪元（epoch）校验，
//! 被替换会话的过期结果一律静默丢弃。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use super::channel::PushChannel;
use super::status::SessionStatus;
use crate::config::StudioConfig;
use crate::error::StudioError;
use crate::models::{
    ActivityEntry, ActivityKind, FileEventData, FileNode, GenerateRequest, ServerEvent, StatusValue,
};
use crate::services::{
    ActivityLog, ApiClient, ContentCache, FileTreeStore, PreviewDocument, PreviewRenderer,
    PreviewTheme, SANDBOX_TOKENS,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 会话概要信息
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// 当前纪元（每次 start_session 递增）
    pub epoch: u64,
    /// 会话状态
    pub status: SessionStatus,
    /// 终态错误消息
    pub error_message: Option<String>,
    /// 会话开始的墙钟时间（仅供展示，排序依赖单调时钟）
    pub started_at: Option<DateTime<Utc>>,
}

/// 协调器共享状态
///
/// 四个数据实体（日志、树、缓存、错误消息）由协调器独占写入，
/// 观察者只读。
struct SessionState {
    api: ApiClient,
    epoch: AtomicU64,
    status: RwLock<SessionStatus>,
    error_message: RwLock<Option<String>>,
    started_at: RwLock<Option<DateTime<Utc>>>,
    activity: ActivityLog,
    tree: FileTreeStore,
    cache: ContentCache,
    channel: Mutex<Option<PushChannel>>,
}

impl SessionState {
    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// 进入 Error 终态（仅当纪元仍然匹配）
    fn enter_error(&self, epoch: u64, message: String) {
        if self.current_epoch() != epoch {
            return;
        }
        *self.status.write() = SessionStatus::Error;
        *self.error_message.write() = Some(message.clone());
        self.activity.append(ActivityKind::Error, message, None);
    }

    /// 进入 Completed 终态（仅当纪元仍然匹配）
    fn enter_completed(&self, epoch: u64, message: Option<String>) {
        if self.current_epoch() != epoch {
            return;
        }
        *self.status.write() = SessionStatus::Completed;
        self.activity.append(
            ActivityKind::Log,
            message.unwrap_or_else(|| "项目生成完成".to_string()),
            None,
        );
        tracing::info!("[SessionCoordinator] 会话 #{} 生成完成", epoch);
    }

    /// 触发一次异步全量树刷新（带纪元标记）
    ///
    /// 多次刷新可以并发进行；对当前纪元而言，最后被应用的
    /// 快照生效（容忍乱序完成）。
    fn spawn_tree_refresh(self: &Arc<Self>, epoch: u64) {
        let state = Arc::clone(self);
        tokio::spawn(async move {
            let result = state.api.fetch_file_tree().await;
            if state.current_epoch() != epoch {
                tracing::debug!("[SessionCoordinator] 丢弃过期的树刷新结果 (epoch {})", epoch);
                return;
            }
            match result {
                Ok(nodes) => state.tree.replace(nodes),
                Err(e) => {
                    tracing::warn!("[SessionCoordinator] 文件树拉取失败: {}", e);
                    state.tree.replace(Vec::new());
                }
            }
        });
    }

    fn on_file_event(
        self: &Arc<Self>,
        epoch: u64,
        kind: ActivityKind,
        message: Option<String>,
        data: Option<FileEventData>,
    ) {
        let payload = data
            .as_ref()
            .map(|d| serde_json::json!({ "path": d.path }));
        self.activity
            .append(kind, message.unwrap_or_default(), payload);
        if let Some(data) = &data {
            self.cache.invalidate(&data.path);
        }
        self.spawn_tree_refresh(epoch);
    }

    /// 处理单个推送事件；返回 false 表示会话已达终态，通道应当关闭
    fn handle_event(self: &Arc<Self>, epoch: u64, event: ServerEvent) -> bool {
        match event {
            ServerEvent::Log { message } => {
                self.activity
                    .append(ActivityKind::Log, message.unwrap_or_default(), None);
                true
            }
            ServerEvent::FileCreate { message, data } => {
                self.on_file_event(epoch, ActivityKind::FileCreate, message, data);
                true
            }
            ServerEvent::FileUpdate { message, data } => {
                self.on_file_event(epoch, ActivityKind::FileUpdate, message, data);
                true
            }
            ServerEvent::FileDelete { message, data } => {
                self.on_file_event(epoch, ActivityKind::FileDelete, message, data);
                true
            }
            ServerEvent::Status { status, message } => match status {
                Some(StatusValue::Completed) => {
                    self.enter_completed(epoch, message);
                    false
                }
                Some(StatusValue::Error) => {
                    self.enter_error(epoch, message.unwrap_or_else(|| "生成失败".to_string()));
                    false
                }
                // 缺失状态值的 status 帧视为畸形，忽略
                None => true,
            },
            ServerEvent::Error { message } => {
                self.enter_error(epoch, message.unwrap_or_else(|| "生成失败".to_string()));
                false
            }
        }
    }
}

/// 推送通道消费任务：严格按到达顺序处理事件
async fn consume_events(
    state: Arc<SessionState>,
    mut ws: WsStream,
    epoch: u64,
    cancel: CancellationToken,
) {
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = ws.next() => frame,
        };
        match frame {
            Some(Ok(Message::Text(text))) => {
                // 会话已被替换，本任务不得再触碰任何状态
                if state.current_epoch() != epoch {
                    break;
                }
                match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => {
                        if !state.handle_event(epoch, event) {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("[SessionCoordinator] 忽略无法解析的事件帧: {}", e);
                    }
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                // 生成过程中的连接中断是终态错误，不重连
                if state.current_epoch() == epoch
                    && *state.status.read() == SessionStatus::Generating
                {
                    state.enter_error(epoch, "与生成服务的连接已断开".to_string());
                }
                break;
            }
            // 二进制 / ping / pong 帧忽略
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                if state.current_epoch() == epoch
                    && *state.status.read() == SessionStatus::Generating
                {
                    state.enter_error(epoch, format!("推送通道错误: {}", e));
                }
                break;
            }
        }
    }
}

/// 会话协调器
pub struct SessionCoordinator {
    state: Arc<SessionState>,
    renderer: PreviewRenderer,
    channel_url: String,
}

impl SessionCoordinator {
    pub fn new(config: StudioConfig) -> Result<Self, StudioError> {
        let api = ApiClient::new(&config)?;
        let renderer = PreviewRenderer::new(config.preview_base());
        let channel_url = config.channel_url()?;
        Ok(Self {
            state: Arc::new(SessionState {
                api,
                epoch: AtomicU64::new(0),
                status: RwLock::new(SessionStatus::Idle),
                error_message: RwLock::new(None),
                started_at: RwLock::new(None),
                activity: ActivityLog::new(config.activity_log_cap),
                tree: FileTreeStore::new(),
                cache: ContentCache::new(),
                channel: Mutex::new(None),
            }),
            renderer,
            channel_url,
        })
    }

    /// 启动一次新的生成会话
    ///
    /// 丢弃旧通道（不等待排空），递增纪元并清空全部会话数据，
    /// 然后建立新的推送通道并发送一次 generate 请求。
    /// 连接失败直接进入 Error 终态，不重试。
    pub async fn start_session(&self, prompt: &str) -> Result<(), StudioError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(StudioError::EmptyPrompt);
        }

        // 旧通道先释放（Drop 内取消消费任务），在途拉取靠纪元校验作废
        if let Some(old) = self.state.channel.lock().take() {
            old.close();
        }

        // 纪元先于任何新请求递增
        let epoch = self.state.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.activity.reset();
        self.state.tree.clear();
        self.state.cache.clear();
        *self.state.error_message.write() = None;
        *self.state.started_at.write() = Some(Utc::now());
        *self.state.status.write() = SessionStatus::Generating;

        let mut ws = match connect_async(self.channel_url.as_str()).await {
            Ok((ws, _)) => ws,
            Err(e) => {
                self.state
                    .enter_error(epoch, format!("无法连接到生成服务: {}", e));
                return Err(StudioError::Connect(e.to_string()));
            }
        };

        let frame = serde_json::to_string(&GenerateRequest::new(prompt)).unwrap_or_default();
        if let Err(e) = ws.send(Message::Text(frame)).await {
            self.state
                .enter_error(epoch, format!("生成请求发送失败: {}", e));
            return Err(StudioError::ChannelSend(e.to_string()));
        }

        self.state
            .activity
            .append(ActivityKind::Log, format!("开始生成: {}", prompt), None);
        tracing::info!("[SessionCoordinator] 会话 #{} 已启动", epoch);

        let cancel = CancellationToken::new();
        let consumer = tokio::spawn(consume_events(
            Arc::clone(&self.state),
            ws,
            epoch,
            cancel.clone(),
        ));
        *self.state.channel.lock() = Some(PushChannel::new(cancel, consumer));
        Ok(())
    }

    /// 当前会话状态
    pub fn status(&self) -> SessionStatus {
        *self.state.status.read()
    }

    /// 终态错误消息
    pub fn error_message(&self) -> Option<String> {
        self.state.error_message.read().clone()
    }

    /// 当前纪元
    pub fn current_epoch(&self) -> u64 {
        self.state.current_epoch()
    }

    /// 活动日志（按追加顺序）
    pub fn activity(&self) -> Vec<ActivityEntry> {
        self.state.activity.entries()
    }

    /// 当前文件树快照
    pub fn tree(&self) -> Vec<FileNode> {
        self.state.tree.get()
    }

    /// 推送通道是否仍然打开
    pub fn channel_open(&self) -> bool {
        self.state
            .channel
            .lock()
            .as_ref()
            .map(|c| !c.is_finished())
            .unwrap_or(false)
    }

    /// 会话概要
    pub fn session_info(&self) -> SessionInfo {
        SessionInfo {
            epoch: self.state.current_epoch(),
            status: self.status(),
            error_message: self.error_message(),
            started_at: *self.state.started_at.read(),
        }
    }

    /// 读取文件内容
    ///
    /// 命中缓存直接返回；未命中则拉取并写入缓存。拉取失败降级为
    /// 空内容（不致命，可手动重试）；跨纪元到达的结果不入缓存。
    pub async fn file_content(&self, path: &str) -> String {
        if let Some(content) = self.state.cache.get(path) {
            return content;
        }
        let epoch = self.state.current_epoch();
        match self.state.api.fetch_file_content(path).await {
            Ok(content) => {
                if self.state.current_epoch() == epoch {
                    self.state.cache.insert(path, content.clone());
                } else {
                    tracing::debug!("[SessionCoordinator] 跨纪元的内容拉取结果不入缓存: {}", path);
                }
                content
            }
            Err(e) => {
                tracing::warn!("[SessionCoordinator] 文件内容拉取失败 {}: {}", path, e);
                String::new()
            }
        }
    }

    /// 生成预览文档：选择 HTML 入口、重写资源引用、按主题注入样式
    pub async fn preview_document(&self, theme: PreviewTheme) -> Option<PreviewDocument> {
        let nodes = self.state.tree.get();
        let path = self.renderer.select_document(&nodes)?;
        let html = self.file_content(&path).await;
        Some(PreviewDocument {
            html: self.renderer.rewrite(&html, theme),
            path,
            sandbox: SANDBOX_TOKENS,
        })
    }

    /// 删除生成的文件并触发一次树刷新
    pub async fn delete_file(&self, path: &str) -> Result<(), StudioError> {
        self.state.api.delete_file(path).await?;
        self.state.cache.invalidate(path);
        self.state.spawn_tree_refresh(self.state.current_epoch());
        Ok(())
    }

    /// 后端健康检查
    pub async fn health(&self) -> Result<serde_json::Value, StudioError> {
        self.state.api.health().await
    }

    /// 在系统文件管理器中打开项目目录
    pub async fn open_project_folder(&self) -> Result<(), StudioError> {
        self.state.api.open_project_folder().await
    }

    /// 关闭当前通道（组件销毁时的收尾）
    pub fn shutdown(&self) {
        if let Some(channel) = self.state.channel.lock().take() {
            channel.close();
        }
    }
}

impl Drop for SessionCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator(base_url: &str) -> SessionCoordinator {
        SessionCoordinator::new(StudioConfig::with_base_url(base_url)).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let coordinator = coordinator("http://127.0.0.1:8000");
        assert_eq!(coordinator.status(), SessionStatus::Idle);
        assert_eq!(coordinator.current_epoch(), 0);
        assert!(coordinator.error_message().is_none());
        assert!(coordinator.activity().is_empty());
        assert!(coordinator.tree().is_empty());
        assert!(!coordinator.channel_open());
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let coordinator = coordinator("http://127.0.0.1:8000");
        let result = coordinator.start_session("   ").await;
        assert!(matches!(result, Err(StudioError::EmptyPrompt)));
        // 校验失败不应触碰会话状态
        assert_eq!(coordinator.status(), SessionStatus::Idle);
        assert_eq!(coordinator.current_epoch(), 0);
    }

    #[tokio::test]
    async fn test_connect_failure_is_terminal_error() {
        // 预留端口后立即释放，保证连接被拒绝
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let coordinator = coordinator(&format!("http://127.0.0.1:{}", port));

        let result = coordinator.start_session("a landing page").await;
        assert!(matches!(result, Err(StudioError::Connect(_))));
        assert_eq!(coordinator.status(), SessionStatus::Error);
        assert!(coordinator.error_message().is_some());
        assert!(!coordinator.channel_open());
        // 连接失败前纪元已递增且数据已清空
        assert_eq!(coordinator.current_epoch(), 1);
    }
}
