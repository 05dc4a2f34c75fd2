//! 影子树（Shadow Tree）：把文档压平成 (路径, 字符串) 叶子列表
//!
//! 深度优先前序遍历；对象按插入顺序、数组按下标顺序。其他组件依赖这个顺序
//! 来保证结果确定。非字符串标量既不输出也不下探。

use serde::Serialize;

use crate::model::node::Node;
use crate::model::path::Path;

/// 一个字符串叶子
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafEntry {
    pub path: Path,
    pub value: String,
}

/// 压平整个文档
pub fn flatten(root: &Node) -> Vec<LeafEntry> {
    let mut out = Vec::new();
    walk(&mut out, root, &Path::root());
    out
}

fn walk(out: &mut Vec<LeafEntry>, node: &Node, path: &Path) {
    match node {
        Node::Object(map) => {
            for (key, child) in map {
                visit(out, child, path.child_key(key));
            }
        }
        Node::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                visit(out, child, path.child_index(idx));
            }
        }
        // 根本身是标量时没有可寻址的叶子
        Node::Leaf(_) | Node::Opaque(_) => {}
    }
}

fn visit(out: &mut Vec<LeafEntry>, child: &Node, path: Path) {
    match child {
        Node::Leaf(value) => out.push(LeafEntry {
            path,
            value: value.clone(),
        }),
        Node::Object(_) | Node::Array(_) => walk(out, child, &path),
        Node::Opaque(_) => {}
    }
}

/// 把所有字符串叶子清空为 ""，结构与非字符串标量保持不变
pub fn clear_leaves(node: &mut Node) {
    match node {
        Node::Leaf(value) => value.clear(),
        Node::Object(map) => map.values_mut().for_each(clear_leaves),
        Node::Array(items) => items.iter_mut().for_each(clear_leaves),
        Node::Opaque(_) => {}
    }
}

/// 统计字符串叶子数量（日志用）
pub fn leaf_count(node: &Node) -> usize {
    match node {
        Node::Leaf(_) => 1,
        Node::Object(map) => map.values().map(leaf_count).sum(),
        Node::Array(items) => items.iter().map(leaf_count).sum(),
        Node::Opaque(_) => 0,
    }
}
