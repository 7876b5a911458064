use crate::error::TransportError;
use crate::http::types::Status;
use crate::parser::Headers;
use std::collections::HashMap;
use std::time::Duration;

/// 单个请求的执行结果
///
/// 设置了 `error` 时，其他字段只包含失败前收到的内容，
/// 不能当作完整的响应。
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// 未收到状态行时为 `None`
    pub status: Option<Status>,
    pub headers: Headers,
    pub body: String,
    pub duration: Duration,
    pub error: Option<TransportError>,
    /// 按捕获规则提取的值；没有匹配时为空
    pub captured_variables: HashMap<String, String>,
}

impl Response {
    pub fn new(status: Status, headers: Headers, body: String, duration: Duration) -> Self {
        Self {
            status: Some(status),
            headers,
            body,
            duration,
            error: None,
            captured_variables: HashMap::new(),
        }
    }

    /// 传输失败的请求对应的响应
    pub fn failed(error: TransportError, duration: Duration) -> Self {
        Self {
            status: None,
            headers: Headers::new(),
            body: String::new(),
            duration,
            error: Some(error),
            captured_variables: HashMap::new(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status.map(|s| s.code())
    }

    /// 状态文本，例如 `200 OK`；没有状态时为空
    pub fn status_text(&self) -> String {
        self.status.map(|s| s.to_string()).unwrap_or_default()
    }

    /// 2xx 状态且没有传输错误
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.status.is_some_and(|s| s.is_success())
    }

    pub fn is_client_error(&self) -> bool {
        self.status.is_some_and(|s| s.is_client_error())
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_some_and(|s| s.is_server_error())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get_ignore_case("content-type")
    }
}
