//! Sentry Telegram Relay CLI
//!
//! 接收 Sentry webhook 并转发到 Telegram

use anyhow::Result;
use clap::{Parser, Subcommand};
use sentry_telegram_relay::cli::{handle_render, handle_serve, RenderArgs, ServeArgs};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sentry-telegram")]
#[command(about = "Sentry Telegram Relay - 将 Sentry 告警转发到 Telegram")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动 webhook 转发服务
    Serve(ServeArgs),
    /// 渲染载荷文件并打印消息（不发送）
    Render(RenderArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` 不存在时忽略
    let dotenv = dotenvy::dotenv().ok();

    // 通过 RUST_LOG 控制日志级别，默认为 info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sentry_telegram_relay=info,sentry_telegram=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    if let Some(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env");
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => handle_serve(args).await?,
        Commands::Render(args) => handle_render(args)?,
    }

    Ok(())
}
