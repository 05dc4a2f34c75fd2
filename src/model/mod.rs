//! 翻译编辑引擎：路径编解码、扁平化、按路径写入、差异计算、跨语言搜索与编辑会话

pub mod data_core;
pub mod diff;
pub mod node;
pub mod path;
pub mod search;
pub mod shadow_tree;
pub mod source;
