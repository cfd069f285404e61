//! 活动日志服务
//!
//! 追加式有序记录。时间戳在追加时分配，取自客户端单调时钟。
//! 默认不限容量；部署方可通过配置设置上限，超限时淘汰最旧条目。

use std::collections::VecDeque;
use std::time::Instant;

use parking_lot::RwLock;

use crate::models::{ActivityEntry, ActivityKind};

struct LogInner {
    /// 单调时钟原点（会话开始时重置）
    origin: Instant,
    entries: VecDeque<ActivityEntry>,
}

/// 活动日志
pub struct ActivityLog {
    inner: RwLock<LogInner>,
    cap: Option<usize>,
}

impl ActivityLog {
    /// 创建日志，`cap` 为 None 时不限容量
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            inner: RwLock::new(LogInner {
                origin: Instant::now(),
                entries: VecDeque::new(),
            }),
            cap,
        }
    }

    /// 追加一条记录
    pub fn append(
        &self,
        kind: ActivityKind,
        message: impl Into<String>,
        payload: Option<serde_json::Value>,
    ) {
        let mut inner = self.inner.write();
        let elapsed_ms = inner.origin.elapsed().as_millis() as u64;
        if let Some(cap) = self.cap {
            while cap > 0 && inner.entries.len() >= cap {
                inner.entries.pop_front();
            }
        }
        inner.entries.push_back(ActivityEntry {
            kind,
            message: message.into(),
            elapsed_ms,
            payload,
        });
    }

    /// 全部记录（按追加顺序）
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.inner.read().entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// 清空记录并重置单调时钟原点（会话开始时调用）
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.origin = Instant::now();
        inner.entries.clear();
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let log = ActivityLog::default();
        log.append(ActivityKind::Log, "first", None);
        log.append(ActivityKind::FileCreate, "second", None);
        log.append(ActivityKind::Error, "third", None);

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[2].message, "third");
    }

    #[test]
    fn test_timestamps_monotonic() {
        let log = ActivityLog::default();
        for i in 0..10 {
            log.append(ActivityKind::Log, format!("entry {}", i), None);
        }
        let entries = log.entries();
        for pair in entries.windows(2) {
            assert!(pair[0].elapsed_ms <= pair[1].elapsed_ms);
        }
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let log = ActivityLog::new(Some(3));
        for i in 0..5 {
            log.append(ActivityKind::Log, format!("entry {}", i), None);
        }
        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "entry 2");
        assert_eq!(entries[2].message, "entry 4");
    }

    #[test]
    fn test_reset_clears_entries() {
        let log = ActivityLog::default();
        log.append(ActivityKind::Log, "before reset", None);
        log.reset();
        assert!(log.is_empty());

        log.append(ActivityKind::Log, "after reset", None);
        assert_eq!(log.len(), 1);
    }
}
