//! 会话配置：语言列表、占位值、草稿命名空间与界面节流参数

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::data_core::AppError;
use crate::model::diff::DEFAULT_PLACEHOLDER;
use crate::utils::fs::read_json_file;

/// 从草稿恢复时基线取自哪里
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// 恢复出的草稿同时作为基线（草稿中的旧修改不再计入差异）
    #[default]
    Restored,
    /// 另行获取权威文档作为基线，草稿只作为 current
    Authoritative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 语言代码，顺序即搜索与导出的遍历顺序
    pub languages: Vec<String>,
    pub placeholder: String,
    pub store_namespace: String,
    pub search_debounce_ms: u64,
    pub saved_indicator_ms: u64,
    pub baseline_policy: BaselinePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            store_namespace: "locale-draft".to_string(),
            search_debounce_ms: 300,
            saved_indicator_ms: 1500,
            baseline_policy: BaselinePolicy::Restored,
        }
    }
}

impl SessionConfig {
    /// 从 JSON 文件读取，缺省字段取默认值
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let config: SessionConfig = read_json_file(path)?;
        tracing::info!("已读取配置: {}，{} 个语言", path.display(), config.languages.len());
        Ok(config)
    }
}
