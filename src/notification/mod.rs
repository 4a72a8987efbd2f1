//! 通知层 - 从 Sentry 载荷到 Telegram 消息
//!
//! 数据流：载荷 → `formatter`（使用 `sanitizer`、`tidy`）→ `dispatcher`（使用 `chunker`）→ 渠道

pub mod channel;
pub mod channels;
pub mod chunker;
pub mod dispatcher;
pub mod event;
pub mod formatter;
pub mod sanitizer;
pub mod tidy;

pub use channel::{NotificationChannel, SendResult};
pub use channels::{TelegramChannel, TelegramConfig};
pub use chunker::{chunk_text, MAX_MESSAGE_LEN};
pub use dispatcher::NotificationDispatcher;
pub use event::{AlertEvent, Level, MetricEvent};
pub use formatter::{format_issue, format_metric, msg};
pub use sanitizer::escape_html;
pub use tidy::tidy_json;
