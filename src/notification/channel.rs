//! 通知渠道 trait 定义

use anyhow::Result;
use async_trait::async_trait;

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（dry-run、空消息等）
    Skipped(String),
    /// 对端拒绝
    Failed(String),
}

/// 通知渠道 trait
///
/// 只负责把一段已格式化的文本发到指定 chat；分片与重试不在渠道层处理。
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 发送一条消息。传输层错误返回 `Err`，对端拒绝返回 `SendResult::Failed`
    async fn send(&self, chat_id: &str, text: &str) -> Result<SendResult>;
}
