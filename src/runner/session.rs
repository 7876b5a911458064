use crate::http::Response;
use crate::parser::{self, HttpFile, Request};
use crate::runner::executor::Executor;
use crate::variable::{Config, EnvLookup, ProcessEnv, VariableSources, Variables};
use crate::{HrunError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 会话初始变量的来源
pub struct SessionOptions {
    pub config: Option<Config>,
    pub environment: Option<String>,
    pub cli_vars: Vec<(String, String)>,
    pub env: Box<dyn EnvLookup>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            config: None,
            environment: None,
            cli_vars: Vec::new(),
            env: Box::new(ProcessEnv),
        }
    }
}

impl SessionOptions {
    fn build_variables(&self, file_variables: &Variables) -> Result<Variables> {
        VariableSources {
            config: self.config.as_ref(),
            environment: self.environment.as_deref(),
            cli_vars: &self.cli_vars,
        }
        .build(file_variables, self.env.as_ref())
    }
}

/// 在指定行打开文件的编辑器命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    pub program: String,
    pub args: Vec<String>,
}

/// 单个请求文件的交互式会话状态
///
/// 用户输入或从响应中捕获的变量保存在运行时层，
/// 优先于文件变量，重新加载后仍然保留。
pub struct Session {
    file: HttpFile,
    runtime: Variables,
    executor: Executor,
    options: SessionOptions,
    last_response: Option<Response>,
}

impl Session {
    /// 解析 `path` 并应用配置的变量来源
    pub fn load<P: AsRef<Path>>(path: P, executor: Executor, options: SessionOptions) -> Result<Self> {
        let file = parser::parse_file(path.as_ref())?;
        Self::from_file(file, executor, options)
    }

    pub fn from_file(mut file: HttpFile, executor: Executor, options: SessionOptions) -> Result<Self> {
        file.variables = options.build_variables(&file.variables)?;
        Ok(Self {
            file,
            runtime: Variables::new(),
            executor,
            options,
            last_response: None,
        })
    }

    pub fn file(&self) -> &HttpFile {
        &self.file
    }

    pub fn requests(&self) -> &[Request] {
        &self.file.requests
    }

    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    /// 文件变量叠加运行时变量
    pub fn effective_variables(&self) -> Variables {
        self.file.variables.layered(&self.runtime)
    }

    pub fn runtime_variables(&self) -> &Variables {
        &self.runtime
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.runtime.insert(name, value);
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<String> {
        self.runtime.remove(name)
    }

    /// 第 `index` 个请求（从 1 开始）替换变量后的副本
    pub fn resolved(&self, index: usize) -> Result<Request> {
        Ok(self.request(index)?.resolve(&self.effective_variables()))
    }

    /// 执行请求，并将捕获的值写入运行时层
    pub async fn execute(&mut self, index: usize) -> Result<&Response> {
        let request = self.resolved(index)?;
        let response = self.executor.execute(&request).await?;

        if !response.captured_variables.is_empty() {
            debug!(count = response.captured_variables.len(), "storing captured variables");
            self.runtime.extend(&response.captured_variables);
        }

        Ok(&*self.last_response.insert(response))
    }

    /// 从磁盘重新读取文件，保留运行时变量
    pub fn reload(&mut self) -> Result<()> {
        let path = self
            .file
            .path
            .clone()
            .ok_or_else(|| HrunError::Other("Session has no file to reload".to_string()))?;

        let mut file = parser::parse_file(&path)?;
        file.variables = self.options.build_variables(&file.variables)?;
        info!(path = %path.display(), requests = file.requests.len(), "reloaded request file");
        self.file = file;
        Ok(())
    }

    /// 第 `index` 个请求的 `$EDITOR +<line> <path>`，未设置时使用 `vim`
    pub fn editor_command(&self, index: usize) -> Result<EditorCommand> {
        let request = self.request(index)?;
        let path = self
            .file
            .path
            .as_ref()
            .ok_or_else(|| HrunError::Other("Request was not loaded from a file".to_string()))?;

        let editor = self
            .options
            .env
            .get("EDITOR")
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "vim".to_string());
        let mut parts = editor.split_whitespace().map(String::from);
        let program = parts.next().unwrap_or_else(|| "vim".to_string());
        let mut args: Vec<String> = parts.collect();
        args.push(format!("+{}", request.source_line));
        args.push(path.display().to_string());

        Ok(EditorCommand { program, args })
    }

    fn request(&self, index: usize) -> Result<&Request> {
        self.file
            .get_by_index(index)
            .ok_or(HrunError::RequestIndexOutOfRange {
                index,
                count: self.file.requests.len(),
            })
    }
}

/// `dir` 下的请求文件（`*.http`、`*.rest`），按路径排序
pub fn discover_http_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        let is_request_file = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("http") || e.eq_ignore_ascii_case("rest"));
        if path.is_file() && is_request_file {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
