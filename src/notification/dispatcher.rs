//! 通知分发器 - 分片并按顺序投递到渠道
//!
//! 投递是 best effort：失败只记录日志，不向请求方传播。

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::channel::{NotificationChannel, SendResult};
use super::chunker::{chunk_text, MAX_MESSAGE_LEN};

/// 通知分发器
#[derive(Clone)]
pub struct NotificationDispatcher {
    channel: Arc<dyn NotificationChannel>,
    /// 是否为 dry-run 模式
    dry_run: bool,
    max_len: usize,
}

impl NotificationDispatcher {
    /// 创建新的分发器
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        info!(channel = channel.name(), "Registering notification channel");
        Self {
            channel,
            dry_run: false,
            max_len: MAX_MESSAGE_LEN,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    /// 后台投递（spawn 后立即返回，调用方不需要等待）
    pub fn deliver(&self, chat_id: impl Into<String>, text: impl Into<String>) -> JoinHandle<()> {
        let dispatcher = self.clone();
        let chat_id = chat_id.into();
        let text = text.into();
        tokio::spawn(async move {
            dispatcher.send_chunks(&chat_id, &text).await;
        })
    }

    /// 分片后依次发送，返回每片的结果
    pub async fn send_chunks(&self, chat_id: &str, text: &str) -> Vec<SendResult> {
        let chunks = chunk_text(text, self.max_len);
        if chunks.is_empty() {
            warn!(chat_id = %chat_id, "Skipping empty message");
            return vec![SendResult::Skipped("empty message".to_string())];
        }

        let total = chunks.len();
        let mut results = Vec::with_capacity(total);
        for (idx, chunk) in chunks.into_iter().enumerate() {
            if self.dry_run {
                eprintln!("[DRY-RUN] chat {} chunk {}/{}:\n{}", chat_id, idx + 1, total, chunk);
                results.push(SendResult::Skipped("dry-run".to_string()));
                continue;
            }

            let result = match self.channel.send(chat_id, chunk).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(channel = self.channel.name(), chat_id = %chat_id, error = %e, "Channel send failed");
                    SendResult::Failed(e.to_string())
                }
            };
            if let SendResult::Failed(reason) = &result {
                warn!(chat_id = %chat_id, chunk = idx + 1, total, reason = %reason, "Chunk not delivered");
            }
            results.push(result);
        }

        results
    }
}
