//! 运行配置 - 启动时构建一次，显式传入服务
//!
//! 来源优先级：命令行参数 > 环境变量（含 `.env`）> 默认值。

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::notification::channels::telegram::{TelegramConfig, DEFAULT_API_BASE};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_PROJECTS_FILE: &str = "projects.json";

/// 服务配置
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Telegram bot token，dry-run 时可以为空
    pub token: Option<String>,
    pub api_base: String,
    pub projects_file: PathBuf,
    pub dry_run: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            projects_file: PathBuf::from(DEFAULT_PROJECTS_FILE),
            dry_run: false,
        }
    }
}

impl RelayConfig {
    /// 校验必需项：非 dry-run 模式必须提供 token
    pub fn validate(&self) -> Result<()> {
        if !self.dry_run && self.token.as_deref().map_or(true, str::is_empty) {
            return Err(anyhow!(
                "缺少 Telegram bot token，请设置 TELEGRAM_TOKEN 或使用 --dry-run"
            ));
        }
        Ok(())
    }

    /// Telegram 渠道配置
    pub fn telegram(&self) -> TelegramConfig {
        TelegramConfig::new(self.token.clone().unwrap_or_default()).with_api_base(&self.api_base)
    }
}
