use crate::parser::Request;
use crate::variable::env::EnvLookup;
use crate::variable::types::Variables;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// 占位符替换
pub struct VariableResolver;

impl VariableResolver {
    /// 将 `{{name}}` 占位符替换为对应的值
    ///
    /// 花括号内的文本原样作为键。未知变量保持不变，
    /// 替换后的值不会再次展开。
    pub fn substitute(text: &str, variables: &Variables) -> String {
        static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = VAR_REGEX.get_or_init(|| Regex::new(r"\{\{([^}]+)\}\}").unwrap());

        re.replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            variables.get(name).unwrap_or(&caps[0]).to_string()
        })
        .into_owned()
    }

    /// 返回替换了 URL、请求体和 Header 值的 `request` 副本
    pub fn resolve_request(request: &Request, variables: &Variables) -> Request {
        let mut resolved = request.clone();
        resolved.url = Self::substitute(&request.url, variables);
        resolved.body = Self::substitute(&request.body, variables);
        resolved
            .headers
            .map_values(|value| Self::substitute(value, variables));
        resolved
    }

    /// 从环境变量中展开 `${VAR}` 引用
    ///
    /// 用于配置文件中的值；未知变量保持不变。
    pub fn resolve_env_vars(text: &str, env: &dyn EnvLookup) -> String {
        static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

        re.replace_all(text, |caps: &Captures| {
            env.get(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
    }
}
