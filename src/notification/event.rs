//! Sentry webhook 载荷模型
//!
//! 所有嵌套字段都显式建模为 `Option`，格式化时按需提取；
//! 只有 `event` 对象是必需的，缺失时整个请求走统一错误处理。
//! 类型不符的可选字段（`null`、数字版本号、非字符串 tag 等）只影响对应段落。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 只展示这些 tag（按 key 过滤）
pub const TAGS_WHITELIST: &[&str] = &["sentry:user"];

/// 触发规则名包含该子串时视为监控告警
pub const MONITORING_ALERT_RULE_NAME: &str = "monitor-alert";

/// 事件级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
    /// info / debug / fatal 等其他级别
    #[default]
    #[serde(other)]
    Other,
}

/// Issue alert webhook 载荷
#[derive(Debug, Clone, Deserialize)]
pub struct AlertEvent {
    /// 路由用的项目标识
    #[serde(default)]
    pub project_slug: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub level: Level,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub culprit: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub triggering_rules: Vec<String>,
    pub event: EventDetails,
}

impl AlertEvent {
    /// 是否由监控规则触发
    pub fn is_monitoring_alert(&self) -> bool {
        self.triggering_rules
            .iter()
            .any(|rule| rule.contains(MONITORING_ALERT_RULE_NAME))
    }

    /// 消息标题：优先 `message`，为空时退回 `event.title`
    pub fn headline(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.event.title.as_deref())
            .unwrap_or_default()
    }
}

/// `event` 嵌套对象
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDetails {
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub user: Option<EventUser>,
    /// `[key, value]` 对，值不一定是字符串
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Value>,
    #[serde(default)]
    pub stacktrace: Option<Value>,
    #[serde(default)]
    pub contexts: Option<Contexts>,
}

impl EventDetails {
    /// 白名单内的字符串 tag 值，保持原始顺序；格式不对的 tag 被跳过
    pub fn whitelisted_tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().filter_map(|tag| match tag.as_array()?.as_slice() {
            [Value::String(key), Value::String(value)]
                if TAGS_WHITELIST.contains(&key.as_str()) =>
            {
                Some(value.as_str())
            }
            _ => None,
        })
    }

    /// `stacktrace`，空值（`false`、`0`、`""`）视为缺失
    pub fn stacktrace(&self) -> Option<&Value> {
        self.stacktrace.as_ref().filter(|v| is_truthy(v))
    }

    /// `contexts.state.state`，空值视为缺失
    pub fn state(&self) -> Option<&Value> {
        self.contexts
            .as_ref()?
            .state
            .as_ref()?
            .state
            .as_ref()
            .filter(|v| is_truthy(v))
    }

    /// 浏览器与设备信息，四项都非空才返回
    pub fn device_info(&self) -> Option<DeviceInfo> {
        let contexts = self.contexts.as_ref()?;
        let browser = contexts.browser.as_ref()?;
        let device = contexts.device.as_ref()?;

        Some(DeviceInfo {
            browser_name: scalar_text(browser.name.as_ref())?,
            browser_version: scalar_text(browser.version.as_ref())?,
            device_brand: scalar_text(device.brand.as_ref())?,
            device_model: scalar_text(device.model.as_ref())?,
        })
    }
}

/// JSON 值的真假判断：`null`、`false`、`0`、`""` 为假，其余（含空对象/数组）为真
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 非空字符串或非零数字转为文本，其它类型返回 `None`
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value.filter(|v| is_truthy(v))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `null` 按缺失处理，使用类型默认值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 用户信息（字段类型不固定，保留原始 JSON）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUser {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub username: Option<Value>,
    #[serde(default)]
    pub ip_address: Option<Value>,
    #[serde(default)]
    pub geo: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Contexts {
    #[serde(default)]
    pub state: Option<StateContext>,
    #[serde(default)]
    pub browser: Option<BrowserContext>,
    #[serde(default)]
    pub device: Option<DeviceContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateContext {
    #[serde(default)]
    pub state: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowserContext {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub version: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceContext {
    #[serde(default)]
    pub brand: Option<Value>,
    #[serde(default)]
    pub model: Option<Value>,
}

/// 完整的设备信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub browser_name: String,
    pub browser_version: String,
    pub device_brand: String,
    pub device_model: String,
}

/// Metric alert webhook 载荷
#[derive(Debug, Clone, Deserialize)]
pub struct MetricEvent {
    /// 目前不参与路由，始终发往默认项目
    #[serde(default)]
    pub project_slug: Option<String>,
    pub data: MetricData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricData {
    pub description_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> AlertEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_level_parsing() {
        let alert = parse(json!({"level": "error", "event": {}}));
        assert_eq!(alert.level, Level::Error);
        let alert = parse(json!({"level": "warning", "event": {}}));
        assert_eq!(alert.level, Level::Warning);
        let alert = parse(json!({"level": "fatal", "event": {}}));
        assert_eq!(alert.level, Level::Other);
        let alert = parse(json!({"event": {}}));
        assert_eq!(alert.level, Level::Other);
    }

    #[test]
    fn test_missing_event_is_rejected() {
        let result = serde_json::from_value::<AlertEvent>(json!({"level": "error"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_headline_prefers_message() {
        let alert = parse(json!({"message": "boom", "event": {"title": "TypeError"}}));
        assert_eq!(alert.headline(), "boom");
        let alert = parse(json!({"message": "", "event": {"title": "TypeError"}}));
        assert_eq!(alert.headline(), "TypeError");
        let alert = parse(json!({"event": {}}));
        assert_eq!(alert.headline(), "");
    }

    #[test]
    fn test_monitoring_alert_detection() {
        let alert = parse(json!({"triggering_rules": ["prod monitor-alert rule"], "event": {}}));
        assert!(alert.is_monitoring_alert());
        let alert = parse(json!({"triggering_rules": ["regular"], "event": {}}));
        assert!(!alert.is_monitoring_alert());
    }

    #[test]
    fn test_whitelisted_tags_keep_order() {
        let alert = parse(json!({"event": {"tags": [
            ["sentry:user", "id:1"],
            ["browser", "Chrome"],
            ["sentry:user", "id:2"]
        ]}}));
        let tags: Vec<&str> = alert.event.whitelisted_tags().collect();
        assert_eq!(tags, vec!["id:1", "id:2"]);
    }

    #[test]
    fn test_state_context() {
        let alert = parse(json!({"event": {"contexts": {"state": {"state": {"route": "/"}}}}}));
        assert_eq!(alert.event.state(), Some(&json!({"route": "/"})));
        let alert = parse(json!({"event": {"contexts": {"state": {}}}}));
        assert!(alert.event.state().is_none());
        let alert = parse(json!({"event": {"contexts": {"state": {"state": null}}}}));
        assert!(alert.event.state().is_none());
    }

    #[test]
    fn test_device_info_requires_all_fields() {
        let alert = parse(json!({"event": {"contexts": {
            "browser": {"name": "Chrome", "version": "120"},
            "device": {"brand": "Apple", "model": "iPhone"},
            "os": {"name": "iOS"}
        }}}));
        let info = alert.event.device_info().unwrap();
        assert_eq!(info.browser_name, "Chrome");
        assert_eq!(info.device_model, "iPhone");

        let alert = parse(json!({"event": {"contexts": {
            "browser": {"name": "Chrome", "version": "120"},
            "device": {"brand": "Apple"}
        }}}));
        assert!(alert.event.device_info().is_none());

        let alert = parse(json!({"event": {"contexts": {
            "browser": {"name": "", "version": "120"},
            "device": {"brand": "Apple", "model": "iPhone"}
        }}}));
        assert!(alert.event.device_info().is_none());
    }

    #[test]
    fn test_null_and_mistyped_optional_fields_are_tolerated() {
        let alert = parse(json!({
            "level": null,
            "url": null,
            "culprit": null,
            "triggering_rules": null,
            "event": {
                "tags": [["sentry:user", null], ["x", 1], "loose", ["sentry:user", "id:7"]],
                "contexts": {
                    "browser": {"name": "Chrome", "version": 120},
                    "device": {"brand": "Apple", "model": "Mac"}
                }
            }
        }));
        assert_eq!(alert.level, Level::Other);
        assert!(alert.url.is_none());
        assert!(alert.triggering_rules.is_empty());

        let tags: Vec<&str> = alert.event.whitelisted_tags().collect();
        assert_eq!(tags, vec!["id:7"]);

        let info = alert.event.device_info().unwrap();
        assert_eq!(info.browser_version, "120");

        let alert = parse(json!({"event": {"tags": null, "contexts": {
            "browser": {"name": ["Chrome"], "version": "1"},
            "device": {"brand": "Apple", "model": "Mac"}
        }}}));
        assert!(alert.event.whitelisted_tags().next().is_none());
        assert!(alert.event.device_info().is_none());
    }

    #[test]
    fn test_falsy_state_and_stacktrace_are_hidden() {
        for falsy in [json!(false), json!(0), json!(""), json!(null)] {
            let alert = parse(json!({"event": {
                "stacktrace": falsy,
                "contexts": {"state": {"state": falsy}}
            }}));
            assert!(alert.event.state().is_none(), "state {}", falsy);
            assert!(alert.event.stacktrace().is_none(), "stacktrace {}", falsy);
        }

        let alert = parse(json!({"event": {
            "stacktrace": {},
            "contexts": {"state": {"state": []}}
        }}));
        assert_eq!(alert.event.stacktrace(), Some(&json!({})));
        assert_eq!(alert.event.state(), Some(&json!([])));
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!(0.5)));
        assert!(is_truthy(&json!("0")));
        assert!(!is_truthy(&json!(0.0)));
    }

    #[test]
    fn test_metric_event() {
        let metric: MetricEvent = serde_json::from_value(json!({
            "data": {"description_text": "CPU > 90%", "metric_alert": {}}
        }))
        .unwrap();
        assert_eq!(metric.data.description_text, "CPU > 90%");
        assert!(metric.project_slug.is_none());
    }
}
