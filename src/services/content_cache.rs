//! 内容缓存服务
//!
//! 以路径为键缓存拉取到的文件内容。收到 file_update / file_delete
//! 事件时失效对应条目；失效是幂等操作。

use dashmap::DashMap;

/// 内容缓存
#[derive(Default)]
pub struct ContentCache {
    entries: DashMap<String, String>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取缓存内容
    pub fn get(&self, path: &str) -> Option<String> {
        self.entries.get(path).map(|e| e.value().clone())
    }

    /// 写入缓存
    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(path.into(), content.into());
    }

    /// 失效指定路径（幂等）
    pub fn invalidate(&self, path: &str) {
        if self.entries.remove(path).is_some() {
            tracing::debug!("[ContentCache] 失效条目: {}", path);
        }
    }

    /// 清空缓存（会话开始时调用）
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
