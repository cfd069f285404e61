//! 推送事件模型
//!
//! 服务端推送消息的封闭标签联合。新增事件种类会迫使
//! 协调器的 match 在编译期更新；未知 type 或无法解析的帧
//! 在反序列化阶段即被拒绝，由协调器忽略（向前兼容）。

use serde::{Deserialize, Serialize};

/// 文件事件负载
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEventData {
    /// 项目内相对路径（斜杠分隔，区分大小写）
    pub path: String,
}

/// status 事件携带的终态取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusValue {
    Completed,
    Error,
}

/// 服务端推送事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// 普通日志
    Log {
        #[serde(default)]
        message: Option<String>,
    },
    /// 文件创建
    FileCreate {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        data: Option<FileEventData>,
    },
    /// 文件更新
    FileUpdate {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        data: Option<FileEventData>,
    },
    /// 文件删除
    FileDelete {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        data: Option<FileEventData>,
    },
    /// 状态变更（completed / error 为终态）
    Status {
        #[serde(default)]
        status: Option<StatusValue>,
        #[serde(default)]
        message: Option<String>,
    },
    /// 顶层错误
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// 通道建立后发送一次的生成请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// 固定为 "generate"
    pub event: String,
    /// 用户提示词
    pub prompt: String,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            event: "generate".to_string(),
            prompt: prompt.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_event() {
        let event: ServerEvent =
            serde_json::from_str(r#"{"type":"log","message":"AI agent is working..."}"#).unwrap();
        assert_eq!(
            event,
            ServerEvent::Log {
                message: Some("AI agent is working...".to_string())
            }
        );
    }

    #[test]
    fn test_parse_file_create_with_extra_fields() {
        let event: ServerEvent = serde_json::from_str(
            r#"{"type":"file_create","message":"Created: index.html","data":{"path":"index.html","type":"file"}}"#,
        )
        .unwrap();
        match event {
            ServerEvent::FileCreate { data, .. } => {
                assert_eq!(data.unwrap().path, "index.html");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_status_completed() {
        let event: ServerEvent =
            serde_json::from_str(r#"{"type":"status","status":"completed","message":"done"}"#)
                .unwrap();
        assert_eq!(
            event,
            ServerEvent::Status {
                status: Some(StatusValue::Completed),
                message: Some("done".to_string())
            }
        );
    }

    #[test]
    fn test_parse_top_level_error() {
        let event: ServerEvent =
            serde_json::from_str(r#"{"type":"error","message":"LLM quota exceeded"}"#).unwrap();
        assert_eq!(
            event,
            ServerEvent::Error {
                message: Some("LLM quota exceeded".to_string())
            }
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_json::from_str::<ServerEvent>(r#"{"type":"heartbeat"}"#).is_err());
    }

    #[test]
    fn test_missing_fields_tolerated() {
        let event: ServerEvent = serde_json::from_str(r#"{"type":"file_update"}"#).unwrap();
        assert_eq!(
            event,
            ServerEvent::FileUpdate {
                message: None,
                data: None
            }
        );
    }

    #[test]
    fn test_generate_request_wire_shape() {
        let json = serde_json::to_value(GenerateRequest::new("a landing page")).unwrap();
        assert_eq!(json["event"], "generate");
        assert_eq!(json["prompt"], "a landing page");
    }
}
