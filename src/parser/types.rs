use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::variable::{VariableResolver, Variables};

/// 请求行中可用的 HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Head,
        Method::Options,
        Method::Trace,
        Method::Connect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::InvalidMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
            Method::Trace => reqwest::Method::TRACE,
            Method::Connect => reqwest::Method::CONNECT,
        }
    }
}

/// 有序的 Header 多值映射
///
/// 名称保留源文件中的写法，按首次出现的顺序排列；
/// 同名 Header 的每个值都会保留。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个值，保留同名的已有值
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// 按名称精确匹配的第一个值
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// 按名称精确匹配的所有值
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// 忽略 ASCII 大小写匹配的第一个值
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.get_ignore_case(name).is_some()
    }

    /// 不同 Header 名称的数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按顺序遍历所有 (name, value)，包含重复项
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(n, values)| values.iter().map(move |v| (n.as_str(), v.as_str())))
    }

    /// 原地改写每个值，名称不变
    pub fn map_values(&mut self, mut f: impl FnMut(&str) -> String) {
        for (_, values) in &mut self.entries {
            for value in values.iter_mut() {
                *value = f(value);
            }
        }
    }
}

impl From<&reqwest::header::HeaderMap> for Headers {
    fn from(map: &reqwest::header::HeaderMap) -> Self {
        let mut headers = Headers::new();
        for (name, value) in map.iter() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers.append(name.as_str(), value);
        }
        headers
    }
}

/// 将 JSON 响应中 `path` 处的值保存为 `variable_name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaptureRule {
    pub variable_name: String,
    pub path: String,
}

impl CaptureRule {
    pub fn new(variable_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            variable_name: variable_name.into(),
            path: path.into(),
        }
    }
}

/// 从请求文件中解析出的单个请求
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,

    /// 可能仍包含 `{{name}}` 占位符
    pub url: String,

    pub headers: Headers,

    /// 为空表示没有请求体
    pub body: String,

    /// `###` 分隔行上的名称（可选）
    pub name: Option<String>,

    /// 请求行之前的普通注释，以空格连接
    pub description: Option<String>,

    /// 请求行所在的行号（从 1 开始）
    pub source_line: usize,

    pub captures: Vec<CaptureRule>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: String::new(),
            name: None,
            description: None,
            source_line: 0,
            captures: Vec::new(),
        }
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// 返回替换了 URL、Header 值和请求体中占位符的副本
    pub fn resolve(&self, variables: &Variables) -> Request {
        VariableResolver::resolve_request(self, variables)
    }

    /// 列表中使用的简短标签：有名称时用名称，否则用方法和 URL
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} {}", self.method, self.url),
        }
    }
}

/// 整个文件的解析结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpFile {
    /// 源文件路径，内存中的文本为 `None`
    pub path: Option<PathBuf>,

    pub requests: Vec<Request>,

    /// `@name = value` 变量声明
    pub variables: Variables,
}

impl HttpFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn add_request(&mut self, request: Request) {
        self.requests.push(request);
    }

    /// 按名称查找第一个请求
    pub fn find_by_name(&self, name: &str) -> Option<&Request> {
        self.requests.iter().find(|r| r.name.as_deref() == Some(name))
    }

    /// 按位置获取请求（从 1 开始）
    pub fn get_by_index(&self, index: usize) -> Option<&Request> {
        index.checked_sub(1).and_then(|i| self.requests.get(i))
    }
}

/// 解析错误类型
///
/// 格式错误的请求块不会报错，会被直接丢弃。
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid HTTP method '{0}'")]
    InvalidMethod(String),
}

/// 解析结果类型别名
pub type ParseResult<T> = Result<T, ParseError>;
