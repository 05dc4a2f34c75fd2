//! TranslationSession：多语言编辑会话的核心状态
//!
//! 会话独占每个语言的 `current` / `baseline` 文档。获取与草稿存储通过注入的
//! [`DocumentSource`] / [`DraftStore`] 完成，因此可以并存多个相互独立的会话。

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use thiserror::Error;

use crate::config::{BaselinePolicy, SessionConfig};
use crate::model::diff::{diff, diff_detailed, Change, ChangeSet};
use crate::model::node::Node;
use crate::model::path::Path;
use crate::model::search::{search, SearchResult};
use crate::model::shadow_tree::{clear_leaves, leaf_count};
use crate::model::source::{DocumentSource, DraftStore};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("状态错误: {0}")]
    State(String),
    #[error("语言 {code} 获取失败: {reason}")]
    Fetch { code: String, reason: String },
    #[error("语言 {code} 草稿存储失败: {reason}")]
    Store { code: String, reason: String },
    #[error("未加载的语言: {0}")]
    UnknownLanguage(String),
    #[error("语言 {0} 正在重置，暂不接受编辑")]
    ResetInProgress(String),
    #[error("路径为空，不能对根节点赋值")]
    EmptyPath,
}

/// 单个语言的编辑状态
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageState {
    pub code: String,
    /// 正在编辑的文档
    pub current: Node,
    /// 视为“未编辑”的基线，只在加载和重置时替换
    pub baseline: Node,
}

impl LanguageState {
    pub fn new(code: impl Into<String>, current: Node, baseline: Node) -> Self {
        Self {
            code: code.into(),
            current,
            baseline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// 首次加载：结果同时作为 current 与 baseline，并写入草稿
    Load,
    /// 只替换基线（`BaselinePolicy::Authoritative` 下从草稿恢复时）
    Baseline,
    /// 重置：替换 current 与 baseline，并清除草稿
    Reset,
}

/// 一次进行中的获取；同一语言的新票据会使旧票据失效
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub code: String,
    pub kind: FetchKind,
    generation: u64,
}

/// 编辑后的自动保存结果；失败不回滚内存中的修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    AutosaveFailed(String),
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub restored: Vec<String>,
    pub fetched: Vec<String>,
    pub failed: Vec<AppError>,
}

pub struct TranslationSession {
    config: SessionConfig,
    source: Box<dyn DocumentSource>,
    store: Box<dyn DraftStore>,
    phase: SessionPhase,
    languages: HashMap<String, LanguageState>,
    failed: HashSet<String>,
    pending: HashMap<String, (FetchKind, u64)>,
    next_generation: u64,
    saved_at: Option<Instant>,
}

impl TranslationSession {
    pub fn new(
        config: SessionConfig,
        source: Box<dyn DocumentSource>,
        store: Box<dyn DraftStore>,
    ) -> Self {
        Self {
            config,
            source,
            store,
            phase: SessionPhase::Idle,
            languages: HashMap::new(),
            failed: HashSet::new(),
            pending: HashMap::new(),
            next_generation: 0,
            saved_at: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// 已加载的语言，按配置顺序
    pub fn languages(&self) -> impl Iterator<Item = &LanguageState> {
        self.config
            .languages
            .iter()
            .filter_map(|code| self.languages.get(code))
    }

    pub fn language(&self, code: &str) -> Option<&LanguageState> {
        self.languages.get(code)
    }

    /// 加载失败、当前缺席的语言
    pub fn failed_languages(&self) -> Vec<&str> {
        self.config
            .languages
            .iter()
            .filter(|code| self.failed.contains(code.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn is_reset_pending(&self, code: &str) -> bool {
        matches!(self.pending.get(code), Some((FetchKind::Reset, _)))
    }

    /// 加载所有配置的语言：优先从草稿恢复，否则获取并立即写入草稿
    ///
    /// 单个语言失败不影响其他语言，失败记录在返回的报告里。
    pub fn load(&mut self) -> Result<LoadReport, AppError> {
        if self.phase != SessionPhase::Idle {
            return Err(AppError::State(format!("只能在空闲状态加载，当前 {:?}", self.phase)));
        }
        let start = Instant::now();
        let mut report = LoadReport::default();
        self.phase = SessionPhase::Loading;

        for code in self.config.languages.clone() {
            if let Some(restored) = self.restore(&code) {
                tracing::info!("语言 {} 从草稿恢复，{} 个叶子", code, leaf_count(&restored));
                self.languages.insert(
                    code.clone(),
                    LanguageState::new(code.clone(), restored.clone(), restored),
                );
                self.failed.remove(&code);
                report.restored.push(code.clone());

                if self.config.baseline_policy == BaselinePolicy::Authoritative {
                    let ticket = self.begin_fetch(&code, FetchKind::Baseline)?;
                    let result = self.source.fetch(&code);
                    if let Err(e) = self.complete_fetch(ticket, result) {
                        tracing::warn!("语言 {} 基线获取失败，沿用草稿作为基线: {}", code, e);
                    }
                }
                continue;
            }

            let ticket = self.begin_fetch(&code, FetchKind::Load)?;
            let result = self.source.fetch(&code);
            match self.complete_fetch(ticket, result) {
                Ok(_) => report.fetched.push(code),
                Err(e) => report.failed.push(e),
            }
        }

        self.refresh_phase();
        tracing::info!(
            "加载完成：恢复 {}，获取 {}，失败 {}，耗时: {}ms",
            report.restored.len(),
            report.fetched.len(),
            report.failed.len(),
            start.elapsed().as_millis()
        );
        Ok(report)
    }

    /// 重新获取所有语言，替换 current 与 baseline 并清除草稿
    ///
    /// 获取失败的语言保留原状态和草稿。
    pub fn reset(&mut self) -> Result<LoadReport, AppError> {
        if self.phase != SessionPhase::Ready {
            return Err(AppError::State(format!("只能在就绪状态重置，当前 {:?}", self.phase)));
        }
        let start = Instant::now();
        let mut report = LoadReport::default();

        for code in self.config.languages.clone() {
            let ticket = self.begin_fetch(&code, FetchKind::Reset)?;
            let result = self.source.fetch(&code);
            match self.complete_fetch(ticket, result) {
                Ok(_) => report.fetched.push(code),
                Err(e) => report.failed.push(e),
            }
        }

        self.refresh_phase();
        tracing::info!(
            "重置完成：成功 {}，失败 {}，耗时: {}ms",
            report.fetched.len(),
            report.failed.len(),
            start.elapsed().as_millis()
        );
        Ok(report)
    }

    /// 登记一次获取。异步驱动方拿到结果后调用 [`Self::complete_fetch`]。
    pub fn begin_fetch(&mut self, code: &str, kind: FetchKind) -> Result<FetchTicket, AppError> {
        if !self.config.languages.iter().any(|c| c == code) {
            return Err(AppError::UnknownLanguage(code.to_string()));
        }
        match (kind, self.phase) {
            (FetchKind::Load, SessionPhase::Ready) => {
                return Err(AppError::State("已就绪的会话只能通过重置重新获取".into()));
            }
            (FetchKind::Reset, SessionPhase::Idle) => {
                return Err(AppError::State("会话尚未加载，不能重置".into()));
            }
            (FetchKind::Baseline, _) if !self.languages.contains_key(code) => {
                return Err(AppError::UnknownLanguage(code.to_string()));
            }
            _ => {}
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        if let Some((old_kind, _)) = self.pending.insert(code.to_string(), (kind, generation)) {
            tracing::debug!("语言 {} 的 {:?} 获取被新的 {:?} 取代", code, old_kind, kind);
        }
        self.phase = SessionPhase::Loading;
        Ok(FetchTicket {
            code: code.to_string(),
            kind,
            generation,
        })
    }

    /// 应用获取结果
    ///
    /// 返回 `Ok(true)` 表示已应用，`Ok(false)` 表示票据已被取代、结果被丢弃。
    /// 获取错误会消耗票据并原样返回。
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Node, AppError>,
    ) -> Result<bool, AppError> {
        let FetchTicket {
            code,
            kind,
            generation,
        } = ticket;
        match self.pending.get(&code) {
            Some((_, current)) if *current == generation => {
                self.pending.remove(&code);
            }
            _ => {
                tracing::debug!("语言 {} 的过期 {:?} 结果已丢弃", code, kind);
                return Ok(false);
            }
        }

        let outcome = match result {
            Ok(doc) => {
                self.apply_fetched(&code, kind, doc);
                Ok(true)
            }
            Err(e) => {
                match kind {
                    FetchKind::Load => {
                        tracing::error!("语言 {} 加载失败，已跳过: {}", code, e);
                        self.failed.insert(code);
                    }
                    FetchKind::Reset => {
                        tracing::error!("语言 {} 重置失败，保留原状态: {}", code, e);
                    }
                    FetchKind::Baseline => {}
                }
                Err(e)
            }
        };
        self.refresh_phase();
        outcome
    }

    fn apply_fetched(&mut self, code: &str, kind: FetchKind, doc: Node) {
        match kind {
            FetchKind::Load => {
                if let Err(e) = self.store.set(code, &doc) {
                    tracing::warn!("语言 {} 快照写入草稿失败: {}", code, e);
                }
                tracing::info!("语言 {} 已获取，{} 个叶子", code, leaf_count(&doc));
                self.languages
                    .insert(code.to_string(), LanguageState::new(code, doc.clone(), doc));
                self.failed.remove(code);
            }
            FetchKind::Baseline => {
                if let Some(state) = self.languages.get_mut(code) {
                    state.baseline = doc;
                }
            }
            FetchKind::Reset => {
                if let Err(e) = self.store.clear(code) {
                    tracing::warn!("语言 {} 草稿清除失败: {}", code, e);
                }
                self.languages
                    .insert(code.to_string(), LanguageState::new(code, doc.clone(), doc));
                self.failed.remove(code);
            }
        }
    }

    fn refresh_phase(&mut self) {
        if self.phase == SessionPhase::Loading && self.pending.is_empty() {
            self.phase = SessionPhase::Ready;
        }
    }

    fn restore(&self, code: &str) -> Option<Node> {
        match self.store.get(code) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("语言 {} 草稿读取失败，改为获取: {}", code, e);
                None
            }
        }
    }

    /// 按路径写入某个语言的当前文档，并自动保存
    pub fn edit(
        &mut self,
        code: &str,
        raw_path: &str,
        value: &str,
    ) -> Result<SaveStatus, AppError> {
        if self.is_reset_pending(code) {
            return Err(AppError::ResetInProgress(code.to_string()));
        }
        let state = self
            .languages
            .get_mut(code)
            .ok_or_else(|| AppError::UnknownLanguage(code.to_string()))?;

        let path = Path::parse(raw_path);
        state.current.set(&path, value)?;
        tracing::debug!("编辑 {}:{} = {:?}", code, path, value);

        let status = match self.store.set(code, &state.current) {
            Ok(()) => {
                self.saved_at = Some(Instant::now());
                SaveStatus::Saved
            }
            Err(e) => {
                tracing::warn!("语言 {} 自动保存失败，修改仅保留在内存中: {}", code, e);
                SaveStatus::AutosaveFailed(e.to_string())
            }
        };
        Ok(status)
    }

    /// “已保存”提示是否仍应显示
    pub fn saved_indicator_visible(&self, now: Instant) -> bool {
        let window = Duration::from_millis(self.config.saved_indicator_ms);
        self.saved_at
            .is_some_and(|at| now.saturating_duration_since(at) < window)
    }

    /// 把所有语言的字符串叶子清空并保存；基线不变
    ///
    /// 返回自动保存失败（以及因重置进行中而跳过）的语言。
    pub fn clear_all(&mut self) -> Vec<AppError> {
        let mut problems = Vec::new();
        let mut cleared = 0;
        for code in &self.config.languages {
            if matches!(self.pending.get(code), Some((FetchKind::Reset, _))) {
                problems.push(AppError::ResetInProgress(code.clone()));
                continue;
            }
            let Some(state) = self.languages.get_mut(code) else {
                continue;
            };
            clear_leaves(&mut state.current);
            cleared += 1;
            if let Err(e) = self.store.set(code, &state.current) {
                tracing::warn!("语言 {} 清空后保存失败: {}", code, e);
                problems.push(e);
            }
        }
        tracing::info!("已清空 {} 个语言的译文", cleared);
        problems
    }

    /// 各语言的变更集，跳过没有变更的语言；只读
    pub fn export_changes(&self) -> IndexMap<String, ChangeSet> {
        self.languages()
            .map(|state| {
                let changes = diff(&state.current, &state.baseline, &self.config.placeholder);
                (state.code.clone(), changes)
            })
            .filter(|(_, changes)| !changes.is_empty())
            .collect()
    }

    /// 带新增 / 修改 / 删除标记的变更，跳过没有变更的语言
    pub fn export_detailed(&self) -> IndexMap<String, IndexMap<Path, Change>> {
        self.languages()
            .map(|state| {
                let changes =
                    diff_detailed(&state.current, &state.baseline, &self.config.placeholder);
                (state.code.clone(), changes)
            })
            .filter(|(_, changes)| !changes.is_empty())
            .collect()
    }

    /// 导出产物：`{语言: 只含变更路径的嵌套文档}`
    pub fn export_document(&self) -> Result<Node, AppError> {
        let mut root = IndexMap::new();
        for (code, changes) in self.export_changes() {
            root.insert(code, changes.to_document()?);
        }
        Ok(Node::Object(root))
    }

    pub fn export_json(&self) -> Result<String, AppError> {
        let doc = self.export_document()?;
        tracing::info!("导出 {} 个语言的变更", doc_len(&doc));
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// 在所有已加载语言中搜索
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let start = Instant::now();
        let states: Vec<&LanguageState> = self.languages().collect();
        let results = search(&states, query);
        if !query.is_empty() {
            tracing::info!(
                "搜索 \"{}\" 命中 {} 条，耗时: {}ms",
                query,
                results.len(),
                start.elapsed().as_millis()
            );
        }
        results
    }
}

fn doc_len(doc: &Node) -> usize {
    match doc {
        Node::Object(map) => map.len(),
        _ => 0,
    }
}
