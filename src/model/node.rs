//! 文档树：字符串叶子 + 有序对象 / 数组容器，以及按路径读写

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::model::data_core::AppError;
use crate::model::path::{parse_index, Path};

/// 写入数组时最多向末尾之后补齐的空位数；超出则把数组改写为对象
pub const MAX_ARRAY_PADDING: usize = 1024;

/// 该段能否作为 `items` 的下标直接写入
fn fits_array(items: &[Node], step: &str) -> bool {
    parse_index(step).is_some_and(|i| i <= items.len().saturating_add(MAX_ARRAY_PADDING))
}

/// 单个语言的翻译文档
///
/// `Opaque` 保存数字、布尔、null 等非字符串标量：它们随文档原样存取，
/// 但扁平化、比较、搜索都会跳过。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Leaf(String),
    Object(IndexMap<String, Node>),
    Array(Vec<Node>),
    Opaque(Value),
}

impl Default for Node {
    fn default() -> Self {
        Node::Object(IndexMap::new())
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Node::Leaf(s),
            Value::Object(map) => {
                Node::Object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            other => Node::Opaque(other),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from)
    }
}

impl Node {
    pub fn leaf(value: impl Into<String>) -> Self {
        Node::Leaf(value.into())
    }

    /// 新建一个空容器：下一段是（可补齐的）下标则为数组，否则为对象
    fn container_for(next_step: &str) -> Node {
        if parse_index(next_step).is_some_and(|i| i <= MAX_ARRAY_PADDING) {
            Node::Array(Vec::new())
        } else {
            Node::Object(IndexMap::new())
        }
    }

    fn child(&self, step: &str) -> Option<&Node> {
        match self {
            Node::Object(map) => map.get(step),
            Node::Array(items) => parse_index(step).and_then(|i| items.get(i)),
            Node::Leaf(_) | Node::Opaque(_) => None,
        }
    }

    /// 按段取子节点（必要时创建）。`next` 为下一段，用于决定新容器类型；
    /// 为 `None` 时表示末段，由调用方直接赋值。
    ///
    /// 当前节点若是字符串或其他标量，先被替换为与 `step` 匹配的容器。
    fn child_slot(&mut self, step: &str, next: Option<&str>) -> &mut Node {
        let make = || match next {
            Some(n) => Node::container_for(n),
            None => Node::Leaf(String::new()),
        };

        // 数组遇到非下标键或过远的下标：改写为以原下标为键的对象，路径字符串保持不变
        let rekeyed: Option<IndexMap<String, Node>> = match self {
            Node::Array(items) if !fits_array(items, step) => Some(
                std::mem::take(items)
                    .into_iter()
                    .enumerate()
                    .map(|(i, node)| (i.to_string(), node))
                    .collect(),
            ),
            _ => None,
        };
        if let Some(map) = rekeyed {
            *self = Node::Object(map);
        }

        match self {
            Node::Object(map) => map.entry(step.to_string()).or_insert_with(make),
            Node::Array(items) => {
                // fits_array 已保证下标不超过 len + MAX_ARRAY_PADDING
                let index = parse_index(step).unwrap_or_default();
                if index >= items.len() {
                    items.resize(index + 1, Node::Opaque(Value::Null));
                }
                let slot = &mut items[index];
                if matches!(slot, Node::Opaque(Value::Null)) {
                    *slot = make();
                }
                slot
            }
            Node::Leaf(_) | Node::Opaque(_) => {
                *self = Node::container_for(step);
                self.child_slot(step, next)
            }
        }
    }

    /// 按路径写入字符串，沿途缺失的容器自动创建
    ///
    /// 原地修改：根节点若不是容器会被替换，调用方继续使用同一个 `Node` 即可。
    /// 途经的字符串叶子会被新容器覆盖。
    pub fn set(&mut self, path: &Path, value: impl Into<String>) -> Result<(), AppError> {
        let steps = path.steps();
        let Some((last, parents)) = steps.split_last() else {
            return Err(AppError::EmptyPath);
        };

        let mut cursor = self;
        for (i, step) in parents.iter().enumerate() {
            cursor = cursor.child_slot(step, Some(steps[i + 1].as_str()));
        }
        *cursor.child_slot(last, None) = Node::Leaf(value.into());
        Ok(())
    }

    /// 按路径读取字符串叶子；路径不存在或不是字符串时返回 `None`
    pub fn get(&self, path: &Path) -> Option<&str> {
        match self.node_at(path)? {
            Node::Leaf(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 按路径读取任意节点
    pub fn node_at(&self, path: &Path) -> Option<&Node> {
        path.steps()
            .iter()
            .try_fold(self, |node, step| node.child(step))
    }

    /// 转为 serde_json 值（导出 / 持久化）
    pub fn to_value(&self) -> Value {
        match self {
            Node::Leaf(s) => Value::String(s.clone()),
            Node::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
            Node::Array(items) => Value::Array(items.iter().map(Node::to_value).collect()),
            Node::Opaque(v) => v.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Node {
        Node::from(value)
    }

    #[test]
    fn test_set_creates_array_and_object() {
        let mut root = Node::default();
        root.set(&Path::parse("items.0.label"), "First").unwrap();

        assert_eq!(root.to_value(), json!({"items": [{"label": "First"}]}));
        match &root {
            Node::Object(map) => assert!(matches!(map.get("items"), Some(Node::Array(_)))),
            other => panic!("根节点应为对象: {:?}", other),
        }
    }

    #[test]
    fn test_set_bracket_path() {
        let mut root = Node::default();
        root.set(&Path::parse("menu[1].title"), "Home").unwrap();
        assert_eq!(root.to_value(), json!({"menu": [null, {"title": "Home"}]}));
        assert_eq!(root.get(&Path::parse("menu.1.title")), Some("Home"));
    }

    #[test]
    fn test_set_overwrites_existing_leaf() {
        let mut root = doc(json!({"greeting": "Hello"}));
        root.set(&Path::parse("greeting"), "Hi").unwrap();
        assert_eq!(root.get(&Path::parse("greeting")), Some("Hi"));
    }

    #[test]
    fn test_set_through_string_restructures() {
        // 途经字符串时用新容器覆盖
        let mut root = doc(json!({"title": "Old"}));
        root.set(&Path::parse("title.short"), "T").unwrap();
        assert_eq!(root.to_value(), json!({"title": {"short": "T"}}));

        root.set(&Path::parse("title.short.0"), "x").unwrap();
        assert_eq!(root.to_value(), json!({"title": {"short": ["x"]}}));
    }

    #[test]
    fn test_set_replaces_container_with_leaf() {
        let mut root = doc(json!({"nav": {"home": "Home", "about": "About"}}));
        root.set(&Path::parse("nav"), "flat").unwrap();
        assert_eq!(root.to_value(), json!({"nav": "flat"}));
    }

    #[test]
    fn test_set_named_step_on_array_keeps_paths() {
        let mut root = doc(json!({"list": ["a", "b"]}));
        root.set(&Path::parse("list.extra"), "c").unwrap();
        assert_eq!(root.get(&Path::parse("list.0")), Some("a"));
        assert_eq!(root.get(&Path::parse("list.1")), Some("b"));
        assert_eq!(root.get(&Path::parse("list.extra")), Some("c"));
    }

    #[test]
    fn test_set_huge_index_becomes_object_key() {
        let mut root = Node::default();
        root.set(&Path::parse("items.18446744073709551615"), "x").unwrap();
        assert_eq!(root.to_value(), json!({"items": {"18446744073709551615": "x"}}));

        let mut root = doc(json!({"items": ["a"]}));
        root.set(&Path::parse("items.200000000000000000.label"), "y").unwrap();
        assert_eq!(root.get(&Path::parse("items.0")), Some("a"));
        assert_eq!(
            root.get(&Path::parse("items.200000000000000000.label")),
            Some("y")
        );
        assert!(matches!(root.node_at(&Path::parse("items")), Some(Node::Object(_))));
    }

    #[test]
    fn test_set_padding_limit() {
        let mut root = doc(json!({"list": ["a"]}));
        let near = format!("list.{}", 1 + MAX_ARRAY_PADDING);
        root.set(&Path::parse(&near), "edge").unwrap();
        match root.node_at(&Path::parse("list")) {
            Some(Node::Array(items)) => assert_eq!(items.len(), MAX_ARRAY_PADDING + 2),
            other => panic!("补齐范围内应保持数组: {:?}", other),
        }

        let mut root = doc(json!({"list": ["a"]}));
        let far = format!("list.{}", 2 + MAX_ARRAY_PADDING);
        root.set(&Path::parse(&far), "far").unwrap();
        assert!(matches!(root.node_at(&Path::parse("list")), Some(Node::Object(_))));
        assert_eq!(root.get(&Path::parse(&far)), Some("far"));
    }

    #[test]
    fn test_set_on_scalar_root() {
        let mut root = Node::leaf("just text");
        root.set(&Path::parse("0"), "first").unwrap();
        assert_eq!(root.to_value(), json!(["first"]));
    }

    #[test]
    fn test_set_empty_path_is_error() {
        let mut root = Node::default();
        let result = root.set(&Path::root(), "x");
        assert!(matches!(result, Err(AppError::EmptyPath)));
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut once = doc(json!({"a": {"b": "1"}}));
        once.set(&Path::parse("a.c.2"), "v").unwrap();
        let mut twice = once.clone();
        twice.set(&Path::parse("a.c.2"), "v").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_get_missing_and_non_string() {
        let root = doc(json!({"count": 3, "nested": {"x": "y"}}));
        assert_eq!(root.get(&Path::parse("count")), None);
        assert_eq!(root.get(&Path::parse("nested")), None);
        assert_eq!(root.get(&Path::parse("nested.missing")), None);
        assert_eq!(root.get(&Path::parse("nested.x")), Some("y"));
    }

    #[test]
    fn test_serde_preserves_order_and_scalars() {
        let raw = r#"{"z":"last","a":[1,"two",null],"m":{"flag":true}}"#;
        let node: Node = serde_json::from_str(raw).unwrap();
        let out = serde_json::to_string(&node).unwrap();
        assert_eq!(out, raw);
    }
}
