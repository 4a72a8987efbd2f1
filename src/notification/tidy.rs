//! 结构化数据的缩进文本渲染（用于 State 上下文等任意 JSON）
//!
//! 输出不是 HTML 安全的，调用方需要对整块结果做转义。

use serde_json::Value;

/// 每层缩进的空格数
const INDENT_STEP: usize = 2;

/// 将任意 JSON 值渲染为带缩进、以换行结尾的文本
///
/// 字符串只加双引号，不做内部转义；对象按原始 key 顺序输出。
pub fn tidy_json(value: &Value, indent: usize) -> String {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return "[]\n".to_string();
            }
            let inner = indent + INDENT_STEP;
            let mut result = String::from("[\n");
            for item in items {
                result.push_str(&" ".repeat(inner));
                result.push_str(&tidy_json(item, inner));
            }
            result.push_str(&" ".repeat(indent));
            result.push_str("]\n");
            result
        }
        Value::Object(map) => {
            if map.is_empty() {
                return "{}\n".to_string();
            }
            let inner = indent + INDENT_STEP;
            let mut result = String::from("{\n");
            for (key, item) in map {
                result.push_str(&format!("{}\"{}\": ", " ".repeat(inner), key));
                result.push_str(&tidy_json(item, inner));
            }
            result.push_str(&" ".repeat(indent));
            result.push_str("}\n");
            result
        }
        Value::Null => "null\n".to_string(),
        Value::String(s) => format!("\"{}\"\n", s),
        Value::Bool(b) => format!("{}\n", b),
        Value::Number(n) => format!("{}\n", n),
    }
}
