//! 搜索输入节流：停止输入满一段时间后才触发搜索

use std::time::{Duration, Instant};

use crate::config::SessionConfig;

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::from_millis(config.search_debounce_ms)
    }

    /// 记录最新输入，重新开始计时
    pub fn input(&mut self, query: impl Into<String>, now: Instant) {
        self.pending = Some((query.into(), now));
    }

    /// 到期时取出待搜索的查询
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= self.delay);
        if due {
            self.pending.take().map(|(query, _)| query)
        } else {
            None
        }
    }

    /// 不等待，立即取出（例如回车提交）
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(query, _)| query)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }
}
