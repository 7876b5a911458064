use crate::http::Response;
use colored::*;

pub enum ResponseFormat {
    /// 状态、耗时和简短的响应体
    Compact,
    /// 状态、耗时、Headers 和完整响应体
    Verbose,
}

pub struct ResponseFormatter {
    format: ResponseFormat,
    color: bool,
}

impl ResponseFormatter {
    /// 紧凑模式下超过该长度的响应体只显示大小
    const COMPACT_BODY_LIMIT: usize = 200;

    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn format(&self, response: &Response) -> String {
        if let Some(error) = &response.error {
            return [
                self.paint(format!("Error: {}", error), |s| s.red().bold()),
                self.duration_line(response),
            ]
            .join("\n");
        }

        match self.format {
            ResponseFormat::Compact => self.format_compact(response),
            ResponseFormat::Verbose => self.format_verbose(response),
        }
    }

    fn format_compact(&self, response: &Response) -> String {
        let mut output = vec![self.status_line(response), self.duration_line(response)];

        let body = &response.body;
        if !body.is_empty() && body.len() <= Self::COMPACT_BODY_LIMIT {
            output.push(body.to_string());
        } else if !body.is_empty() {
            output.push(format!("Body: {} bytes", body.len()));
        }

        output.join("\n")
    }

    fn format_verbose(&self, response: &Response) -> String {
        let mut output = vec![self.status_line(response), self.duration_line(response)];

        if !response.headers.is_empty() {
            output.push(String::new());
            output.push(self.paint("Headers:".to_string(), |s| s.blue().bold()));
            for (name, value) in response.headers.iter() {
                output.push(format!("  {}: {}", name, value));
            }
        }

        if !response.body.is_empty() {
            output.push(String::new());
            output.push(self.paint("Body:".to_string(), |s| s.blue().bold()));
            output.push(format_body(response));
        }

        output.join("\n")
    }

    fn status_line(&self, response: &Response) -> String {
        let line = format!("Status: {}", response.status_text());
        if !self.color {
            return line;
        }
        if response.is_success() {
            line.green().bold().to_string()
        } else if response.is_client_error() {
            line.yellow().bold().to_string()
        } else {
            line.red().bold().to_string()
        }
    }

    fn duration_line(&self, response: &Response) -> String {
        self.paint(
            format!("Duration: {}ms", response.duration.as_millis()),
            |s| s.cyan(),
        )
    }

    fn paint(&self, text: String, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text.as_str()).to_string()
        } else {
            text
        }
    }
}

impl Default for ResponseFormatter {
    fn default() -> Self {
        Self::new(ResponseFormat::Verbose)
    }
}

/// 响应体文本，JSON 时格式化输出
///
/// Content-Type 包含 json 或以 `{`、`[` 开头时视为 JSON；
/// 解析失败时原样返回。
pub fn format_body(response: &Response) -> String {
    let body = &response.body;
    let looks_json = response
        .content_type()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
        || body.trim_start().starts_with(['{', '[']);

    if looks_json {
        if let Some(pretty) = try_format_json(body) {
            return pretty;
        }
    }
    body.to_string()
}

fn try_format_json(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    serde_json::to_string_pretty(&value).ok()
}
