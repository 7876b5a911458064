pub mod http_file;
pub mod types;

// 重新导出常用类型
pub use http_file::HttpFileParser;
pub use types::{CaptureRule, Headers, HttpFile, Method, ParseError, ParseResult, Request};

/// 从文件路径解析 HTTP 文件
pub fn parse_file<P: AsRef<std::path::Path>>(path: P) -> ParseResult<HttpFile> {
    HttpFileParser::parse_file(path)
}

/// 从字符串内容解析 HTTP 请求
pub fn parse_content(content: &str) -> ParseResult<HttpFile> {
    HttpFileParser::parse_content(content)
}
