//! Serve 命令 - 启动 webhook 转发服务

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::config::RelayConfig;
use crate::notification::channels::telegram::{TelegramChannel, DEFAULT_API_BASE};
use crate::notification::dispatcher::NotificationDispatcher;
use crate::project::{ProjectMap, ProjectRouter};
use crate::server::{serve, AppState};

/// Serve 命令参数
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// 监听端口
    #[arg(long, short, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// 监听地址
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// 项目映射文件（JSON）
    #[arg(long, env = "PROJECTS_FILE", default_value = "projects.json")]
    pub projects: PathBuf,

    /// Telegram Bot API 地址
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Dry-run 模式（只打印不发送）
    #[arg(long)]
    pub dry_run: bool,
}

impl From<ServeArgs> for RelayConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            token: args.token,
            api_base: args.api_base,
            projects_file: args.projects,
            dry_run: args.dry_run,
        }
    }
}

/// 处理 serve 命令
pub async fn handle_serve(args: ServeArgs) -> Result<()> {
    let config = RelayConfig::from(args);
    config.validate()?;

    let projects = ProjectMap::load(&config.projects_file)?;
    let channel = Arc::new(TelegramChannel::new(config.telegram()));
    let dispatcher = NotificationDispatcher::new(channel).with_dry_run(config.dry_run);
    info!(
        projects = projects.len(),
        channel = dispatcher.channel_name(),
        "Relay configured"
    );

    let state = AppState::new(ProjectRouter::new(projects), dispatcher);
    serve(&config, state).await
}
