//! 变更集：当前文档相对基线的最小 路径 → 值 差异

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::data_core::AppError;
use crate::model::node::Node;
use crate::model::path::Path;
use crate::model::shadow_tree::flatten;

/// 下拉框“未选择”状态的默认占位值，不属于真实内容
pub const DEFAULT_PLACEHOLDER: &str = "--select--";

/// 单个语言的变更集，按扁平化顺序排列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    entries: IndexMap<Path, String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries.iter().map(|(p, v)| (p, v.as_str()))
    }

    /// 把变更回放到空对象上，得到可导出的嵌套文档
    pub fn to_document(&self) -> Result<Node, AppError> {
        let mut doc = Node::default();
        for (path, value) in &self.entries {
            doc.set(path, value.as_str())?;
        }
        Ok(doc)
    }
}

impl FromIterator<(Path, String)> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = (Path, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// 计算 `current` 相对 `baseline` 的变更
///
/// 基线缺失的路径按 "" 比较；新值为空、等于占位值，或路径本身等于占位值时跳过。
/// 只包含 `current` 中存在的路径，被删除的路径不会出现（见 [`diff_detailed`]）。
pub fn diff(current: &Node, baseline: &Node, placeholder: &str) -> ChangeSet {
    flatten(current)
        .into_iter()
        .filter(|entry| {
            let before = baseline.get(&entry.path).unwrap_or("");
            entry.value != before
                && !entry.value.is_empty()
                && entry.value != placeholder
                && entry.path.to_canonical() != placeholder
        })
        .map(|entry| (entry.path, entry.value))
        .collect()
}

/// 带类型的单路径变更
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    Added { value: String },
    Changed { from: String, to: String },
    Removed { value: String },
}

/// 区分新增 / 修改 / 删除的完整差异
///
/// 新增与修改沿用 [`diff`] 的过滤规则；删除指基线有而当前文档已无此叶子的路径。
pub fn diff_detailed(
    current: &Node,
    baseline: &Node,
    placeholder: &str,
) -> IndexMap<Path, Change> {
    let mut out: IndexMap<Path, Change> = diff(current, baseline, placeholder)
        .entries
        .into_iter()
        .map(|(path, to)| {
            let change = match baseline.get(&path) {
                Some(from) => Change::Changed {
                    from: from.to_string(),
                    to,
                },
                None => Change::Added { value: to },
            };
            (path, change)
        })
        .collect();

    for entry in flatten(baseline) {
        if current.get(&entry.path).is_none() && entry.path.to_canonical() != placeholder {
            out.insert(entry.path, Change::Removed { value: entry.value });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Node {
        Node::from(value)
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let d = doc(json!({"a": "x", "b": ["y", {"c": "z"}]}));
        assert!(diff(&d, &d, DEFAULT_PLACEHOLDER).is_empty());
    }

    #[test]
    fn test_diff_single_edit() {
        let baseline = doc(json!({"greeting": "Hello", "farewell": "Bye"}));
        let mut current = baseline.clone();
        current.set(&Path::parse("greeting"), "Hi").unwrap();

        let changes = diff(&current, &baseline, DEFAULT_PLACEHOLDER);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.get(&Path::parse("greeting")), Some("Hi"));
    }

    #[test]
    fn test_diff_new_path_compares_against_empty() {
        let baseline = doc(json!({}));
        let current = doc(json!({"menu": {"title": "Menu"}}));
        let changes = diff(&current, &baseline, DEFAULT_PLACEHOLDER);
        assert_eq!(changes.get(&Path::parse("menu.title")), Some("Menu"));
    }

    #[test]
    fn test_diff_excludes_empty_and_placeholder() {
        let baseline = doc(json!({"a": "x", "b": "y", "c": "z"}));
        let mut current = doc(json!({
            "a": "",
            "b": DEFAULT_PLACEHOLDER,
            "c": "changed"
        }));
        current.set(&Path::parse(DEFAULT_PLACEHOLDER), "ignored").unwrap();

        let changes = diff(&current, &baseline, DEFAULT_PLACEHOLDER);
        assert_eq!(changes.len(), 1, "只有 c 应被计入: {:?}", changes);
        assert_eq!(changes.get(&Path::parse("c")), Some("changed"));
    }

    #[test]
    fn test_diff_ignores_removed_paths() {
        let baseline = doc(json!({"a": "x", "b": "y"}));
        let current = doc(json!({"a": "x"}));
        assert!(diff(&current, &baseline, DEFAULT_PLACEHOLDER).is_empty());
    }

    #[test]
    fn test_to_document_is_reingestible() {
        let baseline = doc(json!({"nav": {"items": ["Home", "About"]}, "title": "T"}));
        let mut current = baseline.clone();
        current.set(&Path::parse("nav.items.1"), "Om oss").unwrap();
        current.set(&Path::parse("footer.note"), "Ny").unwrap();

        let changes = diff(&current, &baseline, DEFAULT_PLACEHOLDER);
        let exported = changes.to_document().unwrap();
        assert_eq!(
            exported.to_value(),
            json!({"nav": {"items": [null, "Om oss"]}, "footer": {"note": "Ny"}})
        );

        let replayed: ChangeSet = flatten(&exported)
            .into_iter()
            .map(|e| (e.path, e.value))
            .collect();
        assert_eq!(replayed, changes);
    }

    #[test]
    fn test_changeset_serializes_as_flat_map() {
        let changes: ChangeSet = [(Path::parse("a[0].b"), "v".to_string())]
            .into_iter()
            .collect();
        assert_eq!(serde_json::to_value(&changes).unwrap(), json!({"a.0.b": "v"}));
    }

    #[test]
    fn test_diff_detailed_kinds() {
        let baseline = doc(json!({"keep": "k", "edit": "old", "gone": "bye"}));
        let current = doc(json!({"keep": "k", "edit": "new", "fresh": "hi"}));

        let changes = diff_detailed(&current, &baseline, DEFAULT_PLACEHOLDER);
        assert_eq!(changes.len(), 3);
        assert_eq!(
            changes.get(&Path::parse("edit")),
            Some(&Change::Changed {
                from: "old".into(),
                to: "new".into()
            })
        );
        assert_eq!(
            changes.get(&Path::parse("fresh")),
            Some(&Change::Added { value: "hi".into() })
        );
        assert_eq!(
            changes.get(&Path::parse("gone")),
            Some(&Change::Removed { value: "bye".into() })
        );
    }
}
