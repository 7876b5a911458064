//! 捕获引擎：从 JSON 响应体中提取值。
//!
//! 路径以点分隔。数字段用作数组下标，其余作为对象键。
//! 支持 JSONPath 风格的 `$.` 前缀，单独的 `$` 表示整个文档。
//!
//! ```text
//! # @capture token = auth.token
//! # @capture firstId = $.items.0.id
//! ```

use crate::parser::CaptureRule;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// 对响应体应用捕获规则
///
/// 响应体不是合法 JSON 时返回空映射。路径不存在的规则会被跳过；
/// 同名规则以后面的为准。
pub fn capture_variables(body: &str, rules: &[CaptureRule]) -> HashMap<String, String> {
    let mut captured = HashMap::new();
    if rules.is_empty() {
        return captured;
    }

    let document: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "response body is not JSON, nothing captured");
            return captured;
        }
    };

    for rule in rules {
        match lookup(&document, &rule.path) {
            Some(value) => {
                captured.insert(rule.variable_name.clone(), render(value));
            }
            None => debug!(
                variable = %rule.variable_name,
                path = %rule.path,
                "capture path not found"
            ),
        }
    }

    captured
}

/// 沿 `path` 在 `document` 中查找
pub fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    let path = match path.strip_prefix('$') {
        Some("") => return Some(document),
        Some(rest) => rest.strip_prefix('.')?,
        None => path,
    };
    if path.is_empty() {
        return None;
    }

    path.split('.').try_fold(document, |current, segment| match current {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        Value::Object(map) => map.get(segment),
        _ => None,
    })
}

/// 捕获值的字符串形式
///
/// 字符串保持原样，其他标量用 JSON 文本，`null` 为空字符串，
/// 对象和数组为紧凑 JSON。
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
