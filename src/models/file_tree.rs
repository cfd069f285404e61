//! 文件树模型
//!
//! 与拉取端点 GET /api/files 的快照结构一一对应。

use serde::{Deserialize, Serialize};

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
}

/// 文件树节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    /// 项目内相对路径（斜杠分隔，区分大小写）
    pub path: String,
    /// 节点类型
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// 子节点（仅目录存在）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileNode>,
}

impl FileNode {
    /// 构造文件节点
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::File,
            children: Vec::new(),
        }
    }

    /// 构造目录节点
    pub fn directory(path: impl Into<String>, children: Vec<FileNode>) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::Directory,
            children,
        }
    }
}

/// GET /api/files 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesResponse {
    #[serde(default)]
    pub files: Vec<FileNode>,
}

/// GET /api/file/{path} 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContentResponse {
    #[serde(default)]
    pub content: String,
}
