//! 多语言翻译编辑引擎
//!
//! 把任意嵌套、字符串叶子的翻译文档压平成可寻址路径，按路径修改，
//! 按语言与基线比较差异，并在多个语言文档中同时搜索。

pub mod config;
pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use config::{BaselinePolicy, SessionConfig};
pub use model::data_core::{AppError, LanguageState, SaveStatus, SessionPhase, TranslationSession};
pub use model::diff::{diff, ChangeSet};
pub use model::node::Node;
pub use model::path::Path;
pub use model::search::{search, SearchResult};
pub use model::shadow_tree::{flatten, LeafEntry};
