//! 消息分片 - 满足 Telegram 单条消息长度上限

/// Telegram 单条消息最大字符数
pub const MAX_MESSAGE_LEN: usize = 4096;

/// 按固定字符偏移切分文本
///
/// 不考虑单词边界，按 char 计数，不会切断 UTF-8 序列。
/// 返回 `ceil(len / size)` 个片段，拼接后与原文完全一致；空文本返回空列表。
pub fn chunk_text(text: &str, size: usize) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    if size == 0 {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);
    chunks
}
