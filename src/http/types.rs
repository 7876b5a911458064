use std::fmt;

/// 响应的 HTTP 状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(u16);

impl Status {
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn code(&self) -> u16 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.0)
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.0)
    }

    pub fn is_server_error(&self) -> bool {
        (500..=599).contains(&self.0)
    }

    pub fn reason_phrase(&self) -> &'static str {
        reqwest::StatusCode::from_u16(self.0)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
    }
}

impl From<reqwest::StatusCode> for Status {
    fn from(status: reqwest::StatusCode) -> Self {
        Self(status.as_u16())
    }
}

/// 显示为状态文本，例如 `200 OK`
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

/// 根据请求体首字符推断 Content-Type
pub fn infer_content_type(body: &str) -> &'static str {
    let trimmed = body.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        "application/json"
    } else if trimmed.starts_with('<') {
        "application/xml"
    } else {
        "text/plain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert!(Status::new(204).is_success());
        assert!(!Status::new(301).is_success());
        assert!(!Status::new(301).is_client_error());
        assert!(Status::new(404).is_client_error());
        assert!(Status::new(503).is_server_error());
        assert!(!Status::new(199).is_success());
        assert!(!Status::new(300).is_success());
    }

    #[test]
    fn test_status_text() {
        assert_eq!(Status::new(200).to_string(), "200 OK");
        assert_eq!(Status::new(404).to_string(), "404 Not Found");
        assert_eq!(Status::new(599).reason_phrase(), "Unknown");
    }

    #[test]
    fn test_infer_content_type() {
        assert_eq!(infer_content_type(r#"  {"a": 1}"#), "application/json");
        assert_eq!(infer_content_type("[1, 2]"), "application/json");
        assert_eq!(infer_content_type("\n<user/>"), "application/xml");
        assert_eq!(infer_content_type("name=foo"), "text/plain");
    }
}
