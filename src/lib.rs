//! Sentry Telegram Relay - 将 Sentry issue / metric 告警转发到 Telegram 群

pub mod cli;
pub mod config;
pub mod error;
pub mod notification;
pub mod project;
pub mod server;

pub use config::RelayConfig;
pub use error::RelayError;
pub use notification::{
    chunk_text, escape_html, format_issue, format_metric, tidy_json, AlertEvent, MetricEvent,
    NotificationChannel, NotificationDispatcher, SendResult, TelegramChannel, TelegramConfig,
    MAX_MESSAGE_LEN,
};
pub use project::{ProjectEntry, ProjectMap, ProjectRouter, Route};
pub use server::{build_router, AppState};
