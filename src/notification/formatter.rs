//! 消息格式化模块 - 将 Sentry 告警转换为 Telegram HTML 消息
//!
//! 布局是固定模板：每个段落占一行，缺失的段落留空行而不是被移除，
//! 保持与现有群消息一致的形状。

use serde_json::Value;

use super::event::{AlertEvent, Level, MetricEvent};
use super::sanitizer::escape_html;
use super::tidy::tidy_json;

/// 消息文案常量
pub mod msg {
    pub const ERROR: &str = "🛑 Error";
    pub const WARNING: &str = "⚠️ Warning";
    pub const MESSAGE: &str = "📧 Message";
    pub const MONITORING_ALERT: &str = "<b><i>‼️MONITORING ALERT‼️</i></b>";
    pub const ISSUE_LINK: &str = "Issue: ";
    pub const STACKTRACE: &str = "<b>stacktrace:</b> ";
    pub const STATE: &str = "<b>State: </b>";
}

/// 级别对应的标签
pub fn severity_label(level: Level) -> &'static str {
    match level {
        Level::Error => msg::ERROR,
        Level::Warning => msg::WARNING,
        Level::Other => msg::MESSAGE,
    }
}

/// 格式化 issue 告警
///
/// `environment`、`ip_address`、`url` 保持原样输出，其余事件文本全部转义。
pub fn format_issue(alert: &AlertEvent, developers: &[String]) -> String {
    let event = &alert.event;

    let heading = if alert.is_monitoring_alert() {
        format!("{} {}\n", msg::MONITORING_ALERT, developers.join(" "))
    } else {
        String::new()
    };

    let environment = format!("<b>{}</b>", event.environment.as_deref().unwrap_or_default());
    let title = event.title.as_deref().unwrap_or_default();
    let culprit = alert.culprit.as_deref().unwrap_or_default();

    let user = event
        .user
        .as_ref()
        .map(|user| {
            format!(
                "<b>User</b> fingerprint: <code>{}</code>, session <code>{}</code>, IP: {} from {}",
                escape_html(&display_value(user.id.as_ref())),
                escape_html(&display_value(user.username.as_ref())),
                display_value(user.ip_address.as_ref()),
                escape_html(&json_value(user.geo.as_ref())),
            )
        })
        .unwrap_or_default();

    let device = event
        .device_info()
        .map(|info| {
            format!(
                "<b>Browser:</b> {} {}, <b>device: </b> {} {}",
                escape_html(&info.browser_name),
                escape_html(&info.browser_version),
                escape_html(&info.device_brand),
                escape_html(&info.device_model),
            )
        })
        .unwrap_or_default();

    let stacktrace = event
        .stacktrace()
        .map(|st| format!("{}{}\n", msg::STACKTRACE, escape_html(&st.to_string())))
        .unwrap_or_default();

    let state = event
        .state()
        .map(|state| format!("{}{}\n", msg::STATE, escape_html(&tidy_json(state, 0))))
        .unwrap_or_default();

    let tags: String = event
        .whitelisted_tags()
        .map(|value| format!(" {}", escape_html(value)))
        .collect();

    format!(
        "{heading}\n\
         {severity} in {environment}: {headline}\n\
         <b><a href=\"{url}\">{issue_link}</a></b> {title} {culprit}\n\
         {user}\n\
         {device}\n\
         {stacktrace}\n\
         {state}\n\
         {tags}\n  ",
        severity = severity_label(alert.level),
        headline = escape_html(alert.headline()),
        url = alert.url.as_deref().unwrap_or_default(),
        issue_link = msg::ISSUE_LINK,
        title = escape_html(title),
        culprit = escape_html(culprit),
    )
}

/// 格式化 metric 告警：原样返回 Sentry 生成的描述，不转义
pub fn format_metric(metric: &MetricEvent, _developers: &[String]) -> String {
    metric.data.description_text.clone()
}

/// 字符串原样输出，其它值按 JSON 文本输出，缺失为空
fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// 紧凑 JSON 文本，缺失为 `null`
fn json_value(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_else(|| "null".to_string())
}
