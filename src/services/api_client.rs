//! 拉取端点客户端
//!
//! 封装后端的无状态 HTTP 接口。拉取失败不致命，
//! 由调用方记录日志并降级为空结果。

use std::time::Duration;

use crate::config::StudioConfig;
use crate::error::StudioError;
use crate::models::{FileContentResponse, FileNode, FilesResponse};

/// 拉取客户端
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &StudioConfig) -> Result<Self, StudioError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 拉取完整文件树快照
    pub async fn fetch_file_tree(&self) -> Result<Vec<FileNode>, StudioError> {
        let resp = self
            .http
            .get(self.url("/api/files"))
            .send()
            .await?
            .error_for_status()?;
        let body: FilesResponse = resp.json().await?;
        Ok(body.files)
    }

    /// 拉取单个文件内容
    pub async fn fetch_file_content(&self, path: &str) -> Result<String, StudioError> {
        let url = format!("{}/api/file/{}", self.base_url, urlencoding::encode(path));
        let resp = self.http.get(url).send().await?.error_for_status()?;
        let body: FileContentResponse = resp.json().await?;
        Ok(body.content)
    }

    /// 删除生成的文件
    pub async fn delete_file(&self, path: &str) -> Result<(), StudioError> {
        let url = format!("{}/api/file/{}", self.base_url, urlencoding::encode(path));
        self.http.delete(url).send().await?.error_for_status()?;
        Ok(())
    }

    /// 后端健康检查
    pub async fn health(&self) -> Result<serde_json::Value, StudioError> {
        let resp = self
            .http
            .get(self.url("/api/health"))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    /// 在系统文件管理器中打开项目目录（响应不消费）
    pub async fn open_project_folder(&self) -> Result<(), StudioError> {
        self.http
            .post(self.url("/api/open-folder"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
