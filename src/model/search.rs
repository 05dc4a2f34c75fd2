//! 跨语言搜索：在所有语言的当前文档与基线中查找路径或文本

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::model::data_core::LanguageState;
use crate::model::path::Path;
use crate::model::shadow_tree::flatten;

/// 单个命中路径在各语言下的取值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub path: Path,
    pub current_by_language: IndexMap<String, String>,
    pub baseline_by_language: IndexMap<String, String>,
    /// 按语言顺序第一个命中的语言，界面默认在该语言下编辑
    pub first_matching_language: String,
}

/// 不区分大小写的子串搜索
///
/// 空查询返回空列表。路径按“语言顺序 × 扁平化顺序”首次出现的次序排列；
/// 同样的输入总是得到同样的结果。
pub fn search(states: &[&LanguageState], query: &str) -> Vec<SearchResult> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    let contains = |text: &str| text.to_lowercase().contains(&needle);

    let mut union: IndexSet<Path> = IndexSet::new();
    for state in states {
        union.extend(flatten(&state.current).into_iter().map(|e| e.path));
    }

    let mut results = Vec::new();
    for path in union {
        let path_hit = contains(path.to_canonical().as_str());
        let mut current_by_language = IndexMap::with_capacity(states.len());
        let mut baseline_by_language = IndexMap::with_capacity(states.len());
        let mut first_match: Option<&str> = None;

        for state in states {
            let current = state.current.get(&path).unwrap_or("");
            let baseline = state.baseline.get(&path).unwrap_or("");
            if first_match.is_none() && (path_hit || contains(current) || contains(baseline)) {
                first_match = Some(state.code.as_str());
            }
            current_by_language.insert(state.code.clone(), current.to_string());
            baseline_by_language.insert(state.code.clone(), baseline.to_string());
        }

        if let Some(code) = first_match {
            results.push(SearchResult {
                path,
                current_by_language,
                baseline_by_language,
                first_matching_language: code.to_string(),
            });
        }
    }

    tracing::debug!("搜索 \"{}\"：{} 个语言，命中 {} 条", query, states.len(), results.len());
    results
}
