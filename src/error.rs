//! 统一错误类型

use thiserror::Error;

/// 客户端核心错误
#[derive(Debug, Error)]
pub enum StudioError {
    /// 提示词为空
    #[error("提示词不能为空")]
    EmptyPrompt,

    /// 推送通道连接失败
    #[error("无法连接到生成服务: {0}")]
    Connect(String),

    /// 推送通道发送失败
    #[error("生成请求发送失败: {0}")]
    ChannelSend(String),

    /// 拉取请求失败
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    /// 后端地址无法解析
    #[error("后端地址解析失败: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
