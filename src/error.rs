use thiserror::Error;

use crate::http::Response;

#[derive(Error, Debug)]
pub enum HrunError {
    #[error("Parse error: {0}")]
    ParseError(#[from] crate::parser::ParseError),

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to build request {method} {url}: {message}")]
    BuildRequest {
        method: String,
        url: String,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Request with name '{0}' not found")]
    RequestNotFound(String),

    #[error("Request index {index} out of range (file has {count} requests)")]
    RequestIndexOutOfRange { index: usize, count: usize },

    #[error("{failed} tests failed")]
    TestsFailed { failed: usize },

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for HrunError {
    fn from(err: anyhow::Error) -> Self {
        HrunError::Other(err.to_string())
    }
}

/// 请求交给传输层之后发生的错误。
///
/// 保存在 [`Response::error`] 中，需要可克隆、可比较。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            TransportError::Timeout(message)
        } else if err.is_connect() {
            TransportError::Connect(message)
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(message)
        } else {
            TransportError::Other(message)
        }
    }
}

/// 某个请求无法构建，顺序执行因此中断。
///
/// 包含失败请求之前得到的所有响应。
#[derive(Error, Debug)]
#[error("Request {index} aborted the run: {source}")]
pub struct SequenceAborted {
    /// 失败请求的位置（从 1 开始）
    pub index: usize,
    pub responses: Vec<Response>,
    #[source]
    pub source: HrunError,
}

/// hrun 的 Result 类型别名
pub type Result<T> = std::result::Result<T, HrunError>;
