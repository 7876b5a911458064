use crate::http::Response;
use crate::parser::Request;
use std::time::Duration;

/// 测试运行中单个请求的结果
#[derive(Debug, Clone)]
pub struct TestResult {
    /// 在文件中的位置（从 1 开始）
    pub request_number: usize,

    pub name: Option<String>,

    pub method: String,

    /// 替换变量后的 URL
    pub url: String,

    pub status: Option<u16>,

    pub duration: Duration,

    /// 2xx 状态且没有错误
    pub success: bool,

    /// 构建或传输失败
    pub error: Option<String>,

    pub response: Option<Response>,
}

impl TestResult {
    pub fn from_response(request_number: usize, request: &Request, response: Response) -> Self {
        Self {
            request_number,
            name: request.name.clone(),
            method: request.method.to_string(),
            url: request.url.clone(),
            status: response.status_code(),
            duration: response.duration,
            success: response.is_success(),
            error: response.error.as_ref().map(|e| e.to_string()),
            response: Some(response),
        }
    }

    pub fn error(
        request_number: usize,
        request: &Request,
        error: String,
        duration: Duration,
    ) -> Self {
        Self {
            request_number,
            name: request.name.clone(),
            method: request.method.to_string(),
            url: request.url.clone(),
            status: None,
            duration,
            success: false,
            error: Some(error),
            response: None,
        }
    }
}

/// 测试运行汇总
#[derive(Debug, Clone, PartialEq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_duration: Duration,
}

impl TestSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        let total_duration = results.iter().map(|r| r.duration).sum();

        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            total_duration,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::Status;
    use crate::parser::{Headers, Method};

    fn response(code: u16, millis: u64) -> Response {
        Response::new(
            Status::new(code),
            Headers::new(),
            String::new(),
            Duration::from_millis(millis),
        )
    }

    #[test]
    fn test_result_from_response() {
        let mut request = Request::new(Method::Get, "http://example.com/users");
        request.name = Some("List users".to_string());

        let result = TestResult::from_response(1, &request, response(200, 12));
        assert!(result.success);
        assert_eq!(result.status, Some(200));
        assert_eq!(result.name.as_deref(), Some("List users"));
        assert_eq!(result.method, "GET");
        assert!(result.error.is_none());

        let result = TestResult::from_response(2, &request, response(500, 3));
        assert!(!result.success);
    }

    #[test]
    fn test_result_with_transport_error_fails() {
        let request = Request::new(Method::Get, "http://localhost:1");
        let failed = Response::failed(
            TransportError::Connect("refused".to_string()),
            Duration::from_millis(2),
        );

        let result = TestResult::from_response(1, &request, failed);
        assert!(!result.success);
        assert_eq!(result.status, None);
        assert!(result.error.unwrap().contains("refused"));
    }

    #[test]
    fn test_summary_counts() {
        let request = Request::new(Method::Post, "http://example.com");
        let results = vec![
            TestResult::from_response(1, &request, response(201, 100)),
            TestResult::error(
                2,
                &request,
                "bad url".to_string(),
                Duration::from_millis(200),
            ),
            TestResult::from_response(3, &request, response(404, 50)),
        ];

        let summary = TestSummary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
        assert!(!summary.all_passed());
        assert_eq!(summary.total_duration, Duration::from_millis(350));
    }
}
