//! 程序入口：初始化日志、按目录装配编辑会话，并执行一次命令

use std::{fs, path::PathBuf, time::Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::SubscriberBuilder;

use locale_editor::utils::fs::{discover_languages, FsDocumentSource, FsDraftStore};
use locale_editor::vm::bridge::{save_message, status_message, STATUS_ERROR_PREFIX};
use locale_editor::{SessionConfig, TranslationSession};

#[derive(Debug, Parser)]
#[command(
    name = "locale_editor",
    about = "翻译文档编辑：跨语言搜索、按路径修改、导出变更",
    version
)]
struct Cli {
    /// 权威翻译目录，内含 `<code>.json`
    #[arg(long, default_value = "locales")]
    locales: PathBuf,

    /// 草稿（自动保存）目录
    #[arg(long, default_value = ".drafts")]
    drafts: PathBuf,

    /// JSON 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 覆盖配置中的语言列表，逗号分隔
    #[arg(long, value_delimiter = ',')]
    languages: Vec<String>,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 在所有语言中搜索路径或译文（不区分大小写）
    Search { query: String },

    /// 按路径修改某个语言的译文，例如 `edit sv menu[0].label Start`
    Edit {
        language: String,
        path: String,
        value: String,
    },

    /// 导出各语言相对基线的变更
    Export {
        /// 输出文件，缺省打印到标准输出
        #[arg(long)]
        out: Option<PathBuf>,

        /// 输出新增 / 修改 / 删除明细，而不是可回放的嵌套文档
        #[arg(long)]
        detailed: bool,
    },

    /// 清空所有语言的译文（保留结构）
    Clear,

    /// 重新获取权威翻译并丢弃草稿
    Reset,
}

fn build_session(cli: &Cli) -> Result<TranslationSession> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("读取配置失败: {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if !cli.languages.is_empty() {
        config.languages = cli.languages.clone();
    }
    if config.languages.is_empty() {
        config.languages = discover_languages(&cli.locales)
            .with_context(|| format!("无法列出翻译目录: {}", cli.locales.display()))?;
    }
    if config.languages.is_empty() {
        bail!("没有可编辑的语言：{} 中没有 JSON 文件", cli.locales.display());
    }

    let source = FsDocumentSource::new(cli.locales.clone());
    let store = FsDraftStore::new(cli.drafts.clone(), config.store_namespace.clone());
    let mut session = TranslationSession::new(config, Box::new(source), Box::new(store));

    let report = session.load()?;
    for e in &report.failed {
        eprintln!("{}{}", STATUS_ERROR_PREFIX, e);
    }
    Ok(session)
}

fn run(cli: Cli) -> Result<()> {
    let mut session = build_session(&cli)?;

    match cli.command {
        Command::Search { query } => {
            let results = session.search(&query);
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Edit {
            language,
            path,
            value,
        } => {
            let status = session.edit(&language, &path, &value)?;
            println!("{}", save_message(&status));
        }
        Command::Export { out, detailed } => {
            let text = if detailed {
                serde_json::to_string_pretty(&session.export_detailed())?
            } else {
                session.export_json()?
            };
            match out {
                Some(path) => {
                    fs::write(&path, text)
                        .with_context(|| format!("写入导出文件失败: {}", path.display()))?;
                    tracing::info!("变更已导出到: {}", path.display());
                }
                None => println!("{}", text),
            }
        }
        Command::Clear => {
            for e in session.clear_all() {
                eprintln!("{}{}", STATUS_ERROR_PREFIX, e);
            }
            println!("{}", status_message(&session, Instant::now()));
        }
        Command::Reset => {
            let report = session.reset()?;
            for e in &report.failed {
                eprintln!("{}{}", STATUS_ERROR_PREFIX, e);
            }
            println!("{}", status_message(&session, Instant::now()));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志输出；日志走 stderr，stdout 只放结果
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let _ = SubscriberBuilder::default()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();

    run(cli)
}
