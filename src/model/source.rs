//! 外部协作方接口：权威文档来源与本地草稿存储

use crate::model::data_core::AppError;
use crate::model::node::Node;

/// 权威文档来源（例如管理端翻译接口）
pub trait DocumentSource {
    fn fetch(&self, code: &str) -> Result<Node, AppError>;
}

/// 按语言代码存放草稿的简单键值存储，不要求事务
pub trait DraftStore {
    fn get(&self, code: &str) -> Result<Option<Node>, AppError>;
    fn set(&mut self, code: &str, doc: &Node) -> Result<(), AppError>;
    fn clear(&mut self, code: &str) -> Result<(), AppError>;
}
