use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::http::types::infer_content_type;
use crate::parser::Request;
use crate::{HrunError, Result};

/// reqwest 客户端的简单封装，带单请求超时
#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }

    /// 将已替换变量的请求转换为 reqwest 请求
    ///
    /// 复制所有 Header 值，包括重复项。
    /// 有请求体但没有 `Content-Type` 时，根据首字符推断。
    pub fn build(&self, request: &Request) -> Result<reqwest::Request> {
        let url = url::Url::parse(&request.url).map_err(|e| HrunError::InvalidUrl {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        let build_error = |message: String| HrunError::BuildRequest {
            method: request.method.to_string(),
            url: request.url.clone(),
            message,
        };

        let mut headers = HeaderMap::new();
        for (name, value) in request.headers.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| build_error(format!("invalid header name '{}': {}", name, e)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| build_error(format!("invalid value for header '{}': {}", name, e)))?;
            headers.append(header_name, header_value);
        }

        let mut builder = self.inner.request(request.method.into(), url);
        if request.has_body() {
            if !request.headers.contains_ignore_case("content-type") {
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static(infer_content_type(&request.body)),
                );
            }
            builder = builder.body(request.body.clone());
        }

        builder
            .headers(headers)
            .build()
            .map_err(|e| build_error(e.to_string()))
    }

    pub async fn execute(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.inner.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Method;

    fn client() -> Client {
        Client::new(Client::DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_build_copies_duplicate_headers() {
        let mut request = Request::new(Method::Get, "http://example.com/items");
        request.headers.append("Accept", "text/html");
        request.headers.append("Accept", "application/json");

        let built = client().build(&request).unwrap();
        let values: Vec<_> = built
            .headers()
            .get_all("accept")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(values, vec!["text/html", "application/json"]);
        assert_eq!(built.method(), reqwest::Method::GET);
        assert!(built.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_build_infers_content_type() {
        let mut request = Request::new(Method::Post, "http://example.com");
        request.body = r#"{"a": 1}"#.to_string();
        let built = client().build(&request).unwrap();
        assert_eq!(built.headers()[CONTENT_TYPE], "application/json");

        request.body = "<a/>".to_string();
        let built = client().build(&request).unwrap();
        assert_eq!(built.headers()[CONTENT_TYPE], "application/xml");

        request.body = "plain".to_string();
        let built = client().build(&request).unwrap();
        assert_eq!(built.headers()[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_build_keeps_explicit_content_type() {
        let mut request = Request::new(Method::Post, "http://example.com");
        request.headers.append("content-type", "application/x-www-form-urlencoded");
        request.body = "{not json".to_string();

        let built = client().build(&request).unwrap();
        let values: Vec<_> = built.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, vec!["application/x-www-form-urlencoded"]);
    }

    #[test]
    fn test_build_rejects_invalid_url() {
        let request = Request::new(Method::Get, "{{base}}/users");
        let err = client().build(&request).unwrap_err();
        assert!(matches!(err, HrunError::InvalidUrl { .. }));
    }

    #[test]
    fn test_build_rejects_invalid_header_value() {
        let mut request = Request::new(Method::Get, "http://example.com");
        request.headers.append("X-Bad", "line\nbreak");
        let err = client().build(&request).unwrap_err();
        assert!(matches!(err, HrunError::BuildRequest { .. }));
    }
}
