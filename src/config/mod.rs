//! 客户端配置模块
//!
//! 提供后端地址、推送通道路径与预览路由的配置，
//! 支持 serde 反序列化与字段级默认值。

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::StudioError;

/// 默认后端地址
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// 默认推送通道路径
pub const DEFAULT_WS_PATH: &str = "/ws";
/// 默认预览路由前缀
pub const DEFAULT_PREVIEW_ROUTE: &str = "/api/preview";
/// 默认拉取请求超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudioConfig {
    /// 后端 HTTP 地址（如 http://127.0.0.1:8000）
    pub base_url: String,
    /// 推送通道路径
    pub ws_path: String,
    /// 预览路由前缀
    pub preview_route: String,
    /// 拉取请求超时（秒）
    pub request_timeout_secs: u64,
    /// 活动日志容量上限（None 表示不限制）
    pub activity_log_cap: Option<usize>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ws_path: DEFAULT_WS_PATH.to_string(),
            preview_route: DEFAULT_PREVIEW_ROUTE.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            activity_log_cap: None,
        }
    }
}

impl StudioConfig {
    /// 使用指定后端地址创建配置，其余字段取默认值
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// 推送通道完整地址（http -> ws / https -> wss）
    pub fn channel_url(&self) -> Result<String, StudioError> {
        let base = Url::parse(&self.base_url)?;
        let scheme = match base.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        let host = base
            .host_str()
            .ok_or_else(|| StudioError::Connect("后端地址缺少主机名".to_string()))?;
        let mut url = format!("{}://{}", scheme, host);
        if let Some(port) = base.port() {
            url.push_str(&format!(":{}", port));
        }
        url.push_str(&self.ws_path);
        Ok(url)
    }

    /// 拉取端点基础地址（去除末尾斜杠）
    pub fn api_base(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    /// 预览资源前缀（绝对地址，保证重写幂等）
    pub fn preview_base(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.preview_route.trim_end_matches('/')
        )
    }
}
