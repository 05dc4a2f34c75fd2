//! VM桥接层：把会话状态翻译成界面状态文字

use std::time::Instant;

use crate::model::data_core::{SaveStatus, SessionPhase, TranslationSession};

// === 常量定义（消除魔法值） ===
pub const STATUS_IDLE: &str = "未加载";
pub const STATUS_LOADING: &str = "正在加载翻译...";
pub const STATUS_READY: &str = "就绪";
pub const STATUS_SAVED: &str = "已自动保存";
pub const STATUS_AUTOSAVE_FAILED_PREFIX: &str = "自动保存失败（刷新后可能丢失）: ";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

/// 当前应显示的状态文字
pub fn status_message(session: &TranslationSession, now: Instant) -> &'static str {
    match session.phase() {
        SessionPhase::Idle => STATUS_IDLE,
        SessionPhase::Loading => STATUS_LOADING,
        SessionPhase::Ready if session.saved_indicator_visible(now) => STATUS_SAVED,
        SessionPhase::Ready => STATUS_READY,
    }
}

/// 编辑结果的提示文字
pub fn save_message(status: &SaveStatus) -> String {
    match status {
        SaveStatus::Saved => STATUS_SAVED.to_string(),
        SaveStatus::AutosaveFailed(reason) => {
            format!("{}{}", STATUS_AUTOSAVE_FAILED_PREFIX, reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::model::node::Node;
    use crate::utils::memory::{MemorySource, MemoryStore};
    use serde_json::json;

    #[test]
    fn test_status_follows_session() {
        let source = MemorySource::default();
        source.insert("en", Node::from(json!({"title": "Home"})));
        let mut session = TranslationSession::new(
            SessionConfig {
                languages: vec!["en".into()],
                ..SessionConfig::default()
            },
            Box::new(source),
            Box::new(MemoryStore::default()),
        );
        assert_eq!(status_message(&session, Instant::now()), STATUS_IDLE);

        session.load().unwrap();
        assert_eq!(status_message(&session, Instant::now()), STATUS_READY);

        let status = session.edit("en", "title", "Start").unwrap();
        assert_eq!(save_message(&status), STATUS_SAVED);
        assert_eq!(status_message(&session, Instant::now()), STATUS_SAVED);
    }

    #[test]
    fn test_autosave_failure_message() {
        let message = save_message(&SaveStatus::AutosaveFailed("quota".into()));
        assert!(message.starts_with(STATUS_AUTOSAVE_FAILED_PREFIX));
        assert!(message.ends_with("quota"));
    }
}
