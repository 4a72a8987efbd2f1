//! Render 命令 - 离线预览某个 webhook 载荷会生成的消息

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::notification::chunker::{chunk_text, MAX_MESSAGE_LEN};
use crate::notification::event::{AlertEvent, MetricEvent};
use crate::notification::formatter::{format_issue, format_metric};
use crate::project::{missing_project_message, ProjectMap, ProjectRouter, Route};

/// 载荷类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadKind {
    Issue,
    Metric,
}

/// Render 命令参数
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// 载荷类型
    #[arg(long, short, value_enum, default_value = "issue")]
    pub kind: PayloadKind,

    /// Sentry webhook 载荷文件（JSON）
    #[arg(long, short)]
    pub file: PathBuf,

    /// 项目映射文件，用于解析 developers
    #[arg(long)]
    pub projects: Option<PathBuf>,
}

/// 渲染结果
#[derive(Debug)]
pub struct RenderOutput {
    /// 目标 chat（未提供项目映射时为空）
    pub chat_id: Option<String>,
    pub text: String,
    pub chunks: usize,
}

/// 渲染载荷，不发送
pub fn render_payload(kind: PayloadKind, payload: &str, projects: Option<&ProjectMap>) -> Result<RenderOutput> {
    let router = projects.cloned().map(ProjectRouter::new);

    let (chat_id, text) = match kind {
        PayloadKind::Issue => {
            let alert: AlertEvent = serde_json::from_str(payload).context("无效的 issue 载荷")?;
            match router.as_ref().map(|r| r.resolve(alert.project_slug.as_deref())) {
                Some(Route::Project(entry)) => {
                    (Some(entry.chat_id.clone()), format_issue(&alert, &entry.developers))
                }
                Some(Route::Fallback { entry, missing }) => (
                    Some(entry.chat_id.clone()),
                    missing_project_message(&missing),
                ),
                None => (None, format_issue(&alert, &[])),
            }
        }
        PayloadKind::Metric => {
            let metric: MetricEvent = serde_json::from_str(payload).context("无效的 metric 载荷")?;
            match router.as_ref().map(|r| r.fallback()) {
                Some(entry) => (Some(entry.chat_id.clone()), format_metric(&metric, &entry.developers)),
                None => (None, format_metric(&metric, &[])),
            }
        }
    };

    let chunks = chunk_text(&text, MAX_MESSAGE_LEN).len();
    Ok(RenderOutput { chat_id, text, chunks })
}

/// 处理 render 命令
pub fn handle_render(args: RenderArgs) -> Result<()> {
    let payload = std::fs::read_to_string(&args.file)
        .with_context(|| format!("无法读取载荷文件: {}", args.file.display()))?;
    let projects = args.projects.as_deref().map(ProjectMap::load).transpose()?;

    let output = render_payload(args.kind, &payload, projects.as_ref())?;
    if let Some(chat_id) = &output.chat_id {
        eprintln!("chat: {}", chat_id);
    }
    eprintln!("chunks: {}", output.chunks);
    println!("{}", output.text);
    Ok(())
}
