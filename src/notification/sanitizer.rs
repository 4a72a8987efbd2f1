//! HTML 转义 - Telegram `parse_mode=HTML` 下嵌入事件文本前必须调用

/// 转义 HTML 保留字符
///
/// `&` 必须最先替换，否则后续替换产生的实体会被二次转义。
pub fn escape_html(unsafe_text: &str) -> String {
    unsafe_text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}
