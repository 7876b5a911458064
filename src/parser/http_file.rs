use crate::parser::types::{CaptureRule, Headers, HttpFile, Method, ParseResult, Request};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, trace};

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^###\s*(.*)$").unwrap())
}

fn request_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS|TRACE|CONNECT)\s+(.+?)(?:\s+HTTP/[\d.]+)?$",
        )
        .unwrap()
    })
}

fn version_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*HTTP/[\d.]+\s*$").unwrap())
}

fn capture_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@capture\s+(\w+)\s*=\s*(.+)$").unwrap())
}

/// Header 名称中不会出现的字符
const NON_HEADER_CHARS: &[char] = &['"', '{', '}', '<', '>', '[', ']'];

/// 正在构建的请求；有了方法和 URL 才会成为 [`Request`]
#[derive(Debug, Default)]
struct PendingRequest {
    method: Option<Method>,
    url: String,
    headers: Headers,
    name: Option<String>,
    description: Option<String>,
    source_line: usize,
    captures: Vec<CaptureRule>,
}

impl PendingRequest {
    fn named(name: &str) -> Self {
        let name = name.trim();
        Self {
            name: (!name.is_empty()).then(|| name.to_string()),
            ..Self::default()
        }
    }

    fn has_method(&self) -> bool {
        self.method.is_some()
    }

    fn into_request(self, body: String) -> Option<Request> {
        let method = self.method?;
        if self.url.is_empty() {
            return None;
        }
        Some(Request {
            method,
            url: self.url,
            headers: self.headers,
            body,
            name: self.name,
            description: self.description,
            source_line: self.source_line,
            captures: self.captures,
        })
    }
}

/// 逐行扫描时的状态
#[derive(Debug, Default)]
struct ScanState {
    current: Option<PendingRequest>,
    in_body: bool,
    body_lines: Vec<String>,
    description_lines: Vec<String>,
}

impl ScanState {
    fn has_method(&self) -> bool {
        self.current.as_ref().is_some_and(PendingRequest::has_method)
    }

    /// 将完整的待处理请求放入 `file`，并清空累积内容
    fn flush(&mut self, file: &mut HttpFile) {
        let body = self.body_lines.join("\n");
        if let Some(pending) = self.current.take() {
            let line = pending.source_line;
            match pending.into_request(body) {
                Some(request) => {
                    debug!(
                        method = %request.method,
                        url = %request.url,
                        line,
                        "parsed request"
                    );
                    file.add_request(request);
                }
                None => debug!("dropping section without a request line"),
            }
        }
        self.in_body = false;
        self.body_lines.clear();
        self.description_lines.clear();
    }

    fn pending(&mut self) -> &mut PendingRequest {
        self.current.get_or_insert_with(PendingRequest::default)
    }

    fn set_request_line(&mut self, method: Method, url: &str, line_number: usize) {
        let description = (!self.description_lines.is_empty())
            .then(|| self.description_lines.join(" "));
        self.description_lines.clear();

        let pending = self.pending();
        pending.method = Some(method);
        pending.url = url.trim().to_string();
        pending.source_line = line_number;
        if description.is_some() {
            pending.description = description;
        }
    }

    fn push_body(&mut self, line: &str) {
        self.in_body = true;
        self.body_lines.push(line.to_string());
    }
}

/// 单个分类器的处理结果
enum Step {
    Consumed,
    Next,
}

type Classifier = fn(&mut ScanState, &mut HttpFile, &str, usize) -> Step;

/// 行分类器，按顺序尝试，直到某个分类器处理了该行
const CLASSIFIERS: &[Classifier] = &[
    classify_separator,
    classify_body,
    classify_comment,
    classify_variable,
    classify_leading_blank,
    classify_request_line,
    classify_version_line,
    classify_header,
    classify_body_start,
    classify_bare_url,
    classify_fallback,
];

fn classify_separator(state: &mut ScanState, file: &mut HttpFile, line: &str, _: usize) -> Step {
    let Some(caps) = separator_regex().captures(line) else {
        return Step::Next;
    };
    state.flush(file);
    state.current = Some(PendingRequest::named(&caps[1]));
    Step::Consumed
}

fn classify_body(state: &mut ScanState, _: &mut HttpFile, line: &str, _: usize) -> Step {
    if !state.in_body {
        return Step::Next;
    }
    state.body_lines.push(line.to_string());
    Step::Consumed
}

fn classify_comment(state: &mut ScanState, _: &mut HttpFile, line: &str, number: usize) -> Step {
    let Some(text) = strip_comment_marker(line) else {
        return Step::Next;
    };
    if state.has_method() {
        trace!(line = number, "ignoring comment after request line");
        return Step::Consumed;
    }
    if text.is_empty() {
        return Step::Consumed;
    }

    if let Some(caps) = capture_regex().captures(text) {
        let rule = CaptureRule::new(&caps[1], caps[2].trim());
        debug!(line = number, variable = %rule.variable_name, path = %rule.path, "capture directive");
        state.pending().captures.push(rule);
    } else {
        state.pending();
        state.description_lines.push(text.to_string());
    }
    Step::Consumed
}

fn classify_variable(_: &mut ScanState, file: &mut HttpFile, line: &str, number: usize) -> Step {
    let Some(rest) = line.strip_prefix('@') else {
        return Step::Next;
    };
    if let Some((key, value)) = rest.split_once('=') {
        let key = key.trim();
        if !key.is_empty() {
            debug!(line = number, key, "file variable");
            file.variables.insert(key, value.trim());
        }
    }
    Step::Consumed
}

fn classify_leading_blank(state: &mut ScanState, _: &mut HttpFile, line: &str, _: usize) -> Step {
    if state.current.is_none() && line.trim().is_empty() {
        return Step::Consumed;
    }
    Step::Next
}

fn classify_request_line(
    state: &mut ScanState,
    _: &mut HttpFile,
    line: &str,
    number: usize,
) -> Step {
    let Some(caps) = request_line_regex().captures(line) else {
        return Step::Next;
    };
    // 正则只匹配已知的方法
    let Ok(method) = caps[1].parse::<Method>() else {
        return Step::Next;
    };
    state.set_request_line(method, &caps[2], number);
    Step::Consumed
}

fn classify_version_line(_: &mut ScanState, _: &mut HttpFile, line: &str, _: usize) -> Step {
    if version_line_regex().is_match(line) {
        Step::Consumed
    } else {
        Step::Next
    }
}

fn classify_header(state: &mut ScanState, _: &mut HttpFile, line: &str, number: usize) -> Step {
    if !state.has_method() || !line.contains(':') {
        return Step::Next;
    }

    let trimmed = line.trim();
    if trimmed.starts_with(['{', '[', '<']) {
        debug!(line = number, "body starts without a blank line");
        state.push_body(line);
        return Step::Consumed;
    }

    if let Some((name, value)) = line.split_once(':') {
        let name = name.trim();
        if is_header_name(name) {
            state.pending().headers.append(name, value.trim());
        } else {
            debug!(line = number, "colon line is not a header, treating as body");
            state.push_body(line);
        }
    }
    Step::Consumed
}

fn classify_body_start(state: &mut ScanState, _: &mut HttpFile, line: &str, _: usize) -> Step {
    if state.has_method() && line.trim().is_empty() {
        state.in_body = true;
        return Step::Consumed;
    }
    Step::Next
}

fn classify_bare_url(state: &mut ScanState, _: &mut HttpFile, line: &str, number: usize) -> Step {
    let trimmed = line.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        state.set_request_line(Method::Get, trimmed, number);
        return Step::Consumed;
    }
    Step::Next
}

fn classify_fallback(state: &mut ScanState, _: &mut HttpFile, line: &str, number: usize) -> Step {
    if state.has_method() {
        state.push_body(line);
    } else {
        trace!(line = number, "dropping unrecognized line");
    }
    Step::Consumed
}

/// 去掉开头的 `#` 或 `//` 后的文本
fn strip_comment_marker(line: &str) -> Option<&str> {
    line.strip_prefix('#')
        .or_else(|| line.strip_prefix("//"))
        .map(str::trim)
}

fn is_header_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || NON_HEADER_CHARS.contains(&c))
}

/// HTTP 文件解析器
pub struct HttpFileParser;

impl HttpFileParser {
    /// 从文件路径解析
    pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<HttpFile> {
        let bytes = std::fs::read(path.as_ref())?;
        let parsed = Self::parse_content(&String::from_utf8_lossy(&bytes))?;
        Ok(parsed.with_path(path.as_ref().to_path_buf()))
    }

    /// 从字符串内容解析
    ///
    /// 格式错误的部分不会导致失败，不完整的请求会被跳过。
    pub fn parse_content(content: &str) -> ParseResult<HttpFile> {
        let mut file = HttpFile::new();
        let mut state = ScanState::default();

        for (index, line) in content.lines().enumerate() {
            let number = index + 1;
            for classify in CLASSIFIERS {
                if let Step::Consumed = classify(&mut state, &mut file, line, number) {
                    break;
                }
            }
        }
        state.flush(&mut file);

        debug!(
            requests = file.requests.len(),
            variables = file.variables.len(),
            "parsed request file"
        );
        Ok(file)
    }
}
