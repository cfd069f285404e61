//! 文件树存储
//!
//! 保存最近一次成功拉取的完整项目快照。树只会被整体替换，
//! 绝不依据推送事件负载做增量修补——拉取到的快照是唯一权威形态。

use parking_lot::RwLock;

use crate::models::FileNode;

/// 文件树存储
#[derive(Default)]
pub struct FileTreeStore {
    nodes: RwLock<Vec<FileNode>>,
}

impl FileTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换快照（最后一次应用的快照生效）
    pub fn replace(&self, nodes: Vec<FileNode>) {
        *self.nodes.write() = nodes;
    }

    /// 当前快照
    pub fn get(&self) -> Vec<FileNode> {
        self.nodes.read().clone()
    }

    /// 清空（会话开始时调用）
    pub fn clear(&self) {
        self.nodes.write().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }
}
