//! 加载时用于覆盖文件变量的环境变量查询。
//!
//! 进程环境通过 [`EnvLookup`] 注入而不是直接读取，
//! 调用方和测试可以提供自己的来源。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::Result;

/// 只读的环境变量来源
pub trait EnvLookup {
    fn get(&self, key: &str) -> Option<String>;
}

/// 当前进程的环境变量
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// 两层查询，`primary` 有非空值时优先
#[derive(Debug, Clone, Default)]
pub struct LayeredEnv<P, F> {
    primary: P,
    fallback: F,
}

impl<P: EnvLookup, F: EnvLookup> LayeredEnv<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: EnvLookup, F: EnvLookup> EnvLookup for LayeredEnv<P, F> {
    fn get(&self, key: &str) -> Option<String> {
        self.primary
            .get(key)
            .filter(|v| !v.is_empty())
            .or_else(|| self.fallback.get(key))
    }
}

/// 从 dotenv 文件加载的值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotenvFile {
    values: HashMap<String, String>,
}

impl DotenvFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&content))
    }

    /// 解析 `KEY=VALUE` 行
    ///
    /// 跳过空行和 `#` 注释，允许 `export ` 前缀，
    /// 去掉值两侧成对的单引号或双引号。
    pub fn parse(content: &str) -> Self {
        let mut values = HashMap::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!(line = line_num + 1, "skipping malformed dotenv line");
                continue;
            };

            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            values.insert(key.to_string(), unquote(value.trim()).to_string());
        }

        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl EnvLookup for DotenvFile {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
