//! IO helper: JSON 文件读写，以及基于目录的文档来源与草稿存储

use std::{
    fs::{self, File},
    io::{BufReader, ErrorKind},
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};

use crate::model::data_core::AppError;
use crate::model::node::Node;
use crate::model::source::{DocumentSource, DraftStore};

/// 从文件读取JSON数据
pub fn read_json_file<T: DeserializeOwned>(p: &Path) -> Result<T, AppError> {
    let f = File::open(p)?;
    let rdr = BufReader::new(f);
    Ok(serde_json::from_reader(rdr)?)
}

/// 将JSON数据保存到文件（格式化输出）
pub fn write_json_file<T: Serialize + ?Sized>(p: &Path, value: &T) -> Result<(), AppError> {
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let f = File::create(p)?;
    serde_json::to_writer_pretty(f, value)?;
    Ok(())
}

/// 列出目录中的 `<code>.json`，按代码排序
pub fn discover_languages(dir: &Path) -> Result<Vec<String>, AppError> {
    let mut codes = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                codes.push(stem.to_string());
            }
        }
    }
    codes.sort();
    Ok(codes)
}

/// 从目录读取 `<dir>/<code>.json` 作为权威文档
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    dir: PathBuf,
}

impl FsDocumentSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentSource for FsDocumentSource {
    fn fetch(&self, code: &str) -> Result<Node, AppError> {
        let path = self.dir.join(format!("{code}.json"));
        read_json_file(&path).map_err(|e| AppError::Fetch {
            code: code.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })
    }
}

/// 草稿文件 `<dir>/<namespace>.<code>.json`
#[derive(Debug, Clone)]
pub struct FsDraftStore {
    dir: PathBuf,
    namespace: String,
}

impl FsDraftStore {
    pub fn new(dir: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            namespace: namespace.into(),
        }
    }

    fn file_for(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{}.{}.json", self.namespace, code))
    }

    fn store_error(code: &str, e: impl std::fmt::Display) -> AppError {
        AppError::Store {
            code: code.to_string(),
            reason: e.to_string(),
        }
    }
}

impl DraftStore for FsDraftStore {
    fn get(&self, code: &str) -> Result<Option<Node>, AppError> {
        let path = self.file_for(code);
        if !path.exists() {
            return Ok(None);
        }
        read_json_file(&path)
            .map(Some)
            .map_err(|e| Self::store_error(code, e))
    }

    fn set(&mut self, code: &str, doc: &Node) -> Result<(), AppError> {
        write_json_file(&self.file_for(code), doc).map_err(|e| Self::store_error(code, e))
    }

    fn clear(&mut self, code: &str) -> Result<(), AppError> {
        match fs::remove_file(self.file_for(code)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::store_error(code, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_fs_source_reads_language_file() {
        let dir = TempDir::new().expect("创建临时目录失败");
        fs::write(dir.path().join("en.json"), r#"{"greeting": "Hello"}"#).unwrap();

        let source = FsDocumentSource::new(dir.path());
        let doc = source.fetch("en").unwrap();
        assert_eq!(doc.to_value(), json!({"greeting": "Hello"}));

        assert!(matches!(source.fetch("sv"), Err(AppError::Fetch { .. })));
    }

    #[test]
    fn test_fs_store_round_trip_and_clear() {
        let dir = TempDir::new().expect("创建临时目录失败");
        let mut store = FsDraftStore::new(dir.path().join("drafts"), "ns");

        assert!(store.get("en").unwrap().is_none());

        let doc = Node::from(json!({"a": ["x", 1]}));
        store.set("en", &doc).unwrap();
        assert!(dir.path().join("drafts").join("ns.en.json").exists());
        assert_eq!(store.get("en").unwrap(), Some(doc));

        store.clear("en").unwrap();
        assert!(store.get("en").unwrap().is_none());
        store.clear("en").expect("重复清除应当无害");
    }

    #[test]
    fn test_fs_store_corrupt_file_is_store_error() {
        let dir = TempDir::new().expect("创建临时目录失败");
        fs::write(dir.path().join("ns.en.json"), "{broken").unwrap();
        let store = FsDraftStore::new(dir.path(), "ns");
        assert!(matches!(store.get("en"), Err(AppError::Store { .. })));
    }

    #[test]
    fn test_discover_languages_sorted() {
        let dir = TempDir::new().expect("创建临时目录失败");
        for name in ["sv.json", "en.json", "notes.txt"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        assert_eq!(discover_languages(dir.path()).unwrap(), vec!["en", "sv"]);
    }
}
