use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use crate::variable::env::EnvLookup;

/// 变量存储，按名称索引
///
/// 保持有序，列表输出稳定。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    variables: BTreeMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.variables.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    /// 插入所有键值对，覆盖已有值
    pub fn extend<K, V, I>(&mut self, vars: I)
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in vars {
            self.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// 在 `self` 之上叠加 `overlay`，冲突时 `overlay` 优先
    pub fn layered(&self, overlay: &Variables) -> Variables {
        let mut merged = self.clone();
        merged.extend(overlay.iter());
        merged
    }

    /// 用 `env` 中的非空值覆盖已声明的变量
    ///
    /// 返回被覆盖的变量数量。
    pub fn apply_env_overrides(&mut self, env: &dyn EnvLookup) -> usize {
        let mut overridden = 0;
        for (key, value) in self.variables.iter_mut() {
            if let Some(env_value) = env.get(key).filter(|v| !v.is_empty()) {
                tracing::debug!(key = %key, "variable overridden by environment");
                *value = env_value;
                overridden += 1;
            }
        }
        overridden
    }
}

impl From<HashMap<String, String>> for Variables {
    fn from(map: HashMap<String, String>) -> Self {
        let mut vars = Variables::new();
        vars.extend(map);
        vars
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Variables::new();
        vars.extend(iter);
        vars
    }
}

/// 配置文件中的命名环境变量表
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Environment {
    #[serde(flatten)]
    pub variables: BTreeMap<String, String>,
}

/// `hrun.toml` 配置内容
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// 默认请求超时，例如 "30s" 或 "500ms"
    #[serde(default)]
    pub timeout: Option<String>,

    #[serde(default)]
    pub environments: BTreeMap<String, Environment>,
}

impl Config {
    pub fn get_environment(&self, env_name: &str) -> Option<&Environment> {
        self.environments.get(env_name)
    }
}
