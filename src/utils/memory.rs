//! 内存中的文档来源与草稿存储，可注入失败；克隆后共享同一份数据

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use crate::model::data_core::AppError;
use crate::model::node::Node;
use crate::model::source::{DocumentSource, DraftStore};

#[derive(Debug, Default)]
struct SourceInner {
    docs: HashMap<String, Node>,
    failing: HashSet<String>,
    fetches: HashMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    inner: Rc<RefCell<SourceInner>>,
}

impl MemorySource {
    pub fn insert(&self, code: &str, doc: Node) {
        let mut inner = self.inner.borrow_mut();
        inner.failing.remove(code);
        inner.docs.insert(code.to_string(), doc);
    }

    /// 之后对该语言的获取都返回错误
    pub fn fail(&self, code: &str) {
        self.inner.borrow_mut().failing.insert(code.to_string());
    }

    pub fn fetch_count(&self, code: &str) -> usize {
        self.inner.borrow().fetches.get(code).copied().unwrap_or(0)
    }
}

impl DocumentSource for MemorySource {
    fn fetch(&self, code: &str) -> Result<Node, AppError> {
        let mut inner = self.inner.borrow_mut();
        *inner.fetches.entry(code.to_string()).or_default() += 1;
        if inner.failing.contains(code) {
            return Err(AppError::Fetch {
                code: code.to_string(),
                reason: "模拟获取失败".into(),
            });
        }
        inner.docs.get(code).cloned().ok_or_else(|| AppError::Fetch {
            code: code.to_string(),
            reason: "文档不存在".into(),
        })
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    docs: HashMap<String, Node>,
    fail_writes: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl MemoryStore {
    pub fn insert(&self, code: &str, doc: Node) {
        self.inner.borrow_mut().docs.insert(code.to_string(), doc);
    }

    pub fn document(&self, code: &str) -> Option<Node> {
        self.inner.borrow().docs.get(code).cloned()
    }

    /// 模拟配额耗尽等写入失败
    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }
}

impl DraftStore for MemoryStore {
    fn get(&self, code: &str) -> Result<Option<Node>, AppError> {
        Ok(self.document(code))
    }

    fn set(&mut self, code: &str, doc: &Node) -> Result<(), AppError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(AppError::Store {
                code: code.to_string(),
                reason: "存储空间不足".into(),
            });
        }
        inner.docs.insert(code.to_string(), doc.clone());
        Ok(())
    }

    fn clear(&mut self, code: &str) -> Result<(), AppError> {
        self.inner.borrow_mut().docs.remove(code);
        Ok(())
    }
}
