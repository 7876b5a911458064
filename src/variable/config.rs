use crate::variable::env::EnvLookup;
use crate::variable::resolver::VariableResolver;
use crate::variable::types::{Config, Variables};
use crate::{HrunError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "hrun.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| {
            HrunError::Config(format!(
                "Failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// 查找并加载配置文件
    ///
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/hrun/
    pub fn find_and_load() -> Result<Option<Config>> {
        match Self::find() {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::load_from_path(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    fn find() -> Option<PathBuf> {
        if let Ok(mut current) = std::env::current_dir() {
            loop {
                let candidate = current.join(Self::CONFIG_FILE);
                if candidate.exists() {
                    return Some(candidate);
                }
                if !current.pop() {
                    break;
                }
            }
        }

        let home = dirs::home_dir()?;
        let candidate = home.join(".config").join("hrun").join(Self::CONFIG_FILE);
        candidate.exists().then_some(candidate)
    }

    /// 命名环境的变量，`${VAR}` 引用已展开
    pub fn environment_variables(
        config: &Config,
        env_name: &str,
        env: &dyn EnvLookup,
    ) -> Result<Variables> {
        let environment = config.get_environment(env_name).ok_or_else(|| {
            HrunError::Config(format!("Environment '{}' not found in config", env_name))
        })?;

        Ok(environment
            .variables
            .iter()
            .map(|(key, value)| (key.clone(), VariableResolver::resolve_env_vars(value, env)))
            .collect())
    }

    /// 解析命令行变量参数 "key=value"
    pub fn parse_cli_var(s: &str) -> Option<(String, String)> {
        s.split_once('=')
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
    }
}

/// 一次运行中各变量层的来源
#[derive(Default)]
pub struct VariableSources<'a> {
    pub config: Option<&'a Config>,
    pub environment: Option<&'a str>,
    pub cli_vars: &'a [(String, String)],
}

impl VariableSources<'_> {
    /// 为解析后的文件构建初始变量
    ///
    /// 优先级从低到高：文件默认值、配置环境、
    /// `env` 中已声明变量的非空值、`--var`。
    pub fn build(&self, file_variables: &Variables, env: &dyn EnvLookup) -> Result<Variables> {
        let mut variables = file_variables.clone();

        if let Some(name) = self.environment {
            let config = self.config.ok_or_else(|| {
                HrunError::Config(format!(
                    "Environment '{}' requested but no {} was found",
                    name,
                    ConfigLoader::CONFIG_FILE
                ))
            })?;
            variables.extend(ConfigLoader::environment_variables(config, name, env)?.iter());
        }

        let overridden = variables.apply_env_overrides(env);
        if overridden > 0 {
            debug!(overridden, "applied environment overrides");
        }

        variables.extend(self.cli_vars.iter().cloned());
        Ok(variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
[environments.dev]
base_url = "http://localhost:8080"
token = "dev-token"

[environments.prod]
base_url = "https://api.example.com"
token = "${PROD_TOKEN}"
"#;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_from_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(CONFIG.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.environments.len(), 2);
        assert!(config.get_environment("dev").is_some());
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"environments = 3").unwrap();
        temp_file.flush().unwrap();

        let err = ConfigLoader::load_from_path(temp_file.path()).unwrap_err();
        assert!(matches!(err, HrunError::Config(_)));
    }

    #[test]
    fn test_environment_variables_expand_env_refs() {
        let config: Config = toml::from_str(CONFIG).unwrap();
        let vars = ConfigLoader::environment_variables(
            &config,
            "prod",
            &env(&[("PROD_TOKEN", "prod-secret")]),
        )
        .unwrap();
        assert_eq!(vars.get("token"), Some("prod-secret"));

        let missing = ConfigLoader::environment_variables(&config, "qa", &env(&[]));
        assert!(missing.is_err());
    }

    #[test]
    fn test_build_precedence() {
        let config: Config = toml::from_str(CONFIG).unwrap();
        let file_vars: Variables = [
            ("base_url", "http://file"),
            ("token", "file-token"),
            ("user", "file-user"),
            ("page", "1"),
        ]
        .into_iter()
        .collect();
        let cli_vars = vec![("page".to_string(), "3".to_string())];

        let sources = VariableSources {
            config: Some(&config),
            environment: Some("dev"),
            cli_vars: &cli_vars,
        };
        let vars = sources
            .build(&file_vars, &env(&[("user", "env-user"), ("page", "2")]))
            .unwrap();

        assert_eq!(vars.get("base_url"), Some("http://localhost:8080"));
        assert_eq!(vars.get("token"), Some("dev-token"));
        assert_eq!(vars.get("user"), Some("env-user"));
        assert_eq!(vars.get("page"), Some("3"));
    }

    #[test]
    fn test_build_environment_without_config_fails() {
        let sources = VariableSources {
            environment: Some("dev"),
            ..Default::default()
        };
        assert!(sources.build(&Variables::new(), &env(&[])).is_err());
    }

    #[test]
    fn test_parse_cli_var() {
        assert_eq!(
            ConfigLoader::parse_cli_var("key=value"),
            Some(("key".to_string(), "value".to_string()))
        );
        assert_eq!(
            ConfigLoader::parse_cli_var("url=https://example.com?a=b"),
            Some(("url".to_string(), "https://example.com?a=b".to_string()))
        );
        assert_eq!(ConfigLoader::parse_cli_var("invalid"), None);
        assert_eq!(ConfigLoader::parse_cli_var("=value"), None);
    }
}
