//! 基于 [`Session`] 的交互式提示循环。
//!
//! 请求处理都交给会话，本模块只负责选择下一步操作并打印结果。

use crate::parser::Request;
use crate::runner::{Executor, Session, SessionOptions, discover_http_files};
use crate::utils::ResponseFormatter;
use crate::{HrunError, Result};
use colored::Colorize;
use inquire::{InquireError, Select, Text};
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// 主菜单中的一项
#[derive(Debug, Clone, PartialEq)]
enum MenuItem {
    /// 请求位置（从 1 开始）及显示文本
    Request { index: usize, display: String },
    Describe,
    ShowVariables,
    SetVariable,
    RemoveVariable,
    Reload,
    Edit,
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Request { display, .. } => write!(f, "{}", display),
            MenuItem::Describe => write!(f, "[info] Show request description"),
            MenuItem::ShowVariables => write!(f, "[vars] Show variables"),
            MenuItem::SetVariable => write!(f, "[vars] Set variable"),
            MenuItem::RemoveVariable => write!(f, "[vars] Remove runtime variable"),
            MenuItem::Reload => write!(f, "[file] Reload file"),
            MenuItem::Edit => write!(f, "[file] Open request in editor"),
            MenuItem::Quit => write!(f, "Quit"),
        }
    }
}

/// 包装结构，让 `Select` 显示请求并返回其位置
#[derive(Clone)]
struct RequestChoice {
    index: usize,
    display: String,
}

impl fmt::Display for RequestChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

fn menu_items(session: &Session) -> Vec<MenuItem> {
    let mut items: Vec<MenuItem> = request_choices(session)
        .into_iter()
        .map(|c| MenuItem::Request {
            index: c.index,
            display: c.display,
        })
        .collect();
    items.extend([
        MenuItem::Describe,
        MenuItem::ShowVariables,
        MenuItem::SetVariable,
        MenuItem::RemoveVariable,
        MenuItem::Reload,
        MenuItem::Edit,
        MenuItem::Quit,
    ]);
    items
}

fn request_choices(session: &Session) -> Vec<RequestChoice> {
    session
        .requests()
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let display = match &r.name {
                Some(name) => format!("{:>2}. {} {} ({})", i + 1, r.method, r.url, name),
                None => format!("{:>2}. {} {}", i + 1, r.method, r.url),
            };
            RequestChoice {
                index: i + 1,
                display,
            }
        })
        .collect()
}

/// 用户取消时返回 `Ok(None)`
fn cancellable<T>(result: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(HrunError::Other(format!("Prompt failed: {}", e))),
    }
}

fn choose_file() -> Result<Option<PathBuf>> {
    let files = discover_http_files(std::env::current_dir()?)?;
    if files.is_empty() {
        return Err(HrunError::Other(
            "No .http or .rest files found in the current directory".to_string(),
        ));
    }
    if files.len() == 1 {
        return Ok(files.into_iter().next());
    }

    let names: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
    let chosen = cancellable(Select::new("Select a request file:", names).prompt())?;
    Ok(chosen.map(PathBuf::from))
}

/// 运行交互循环，直到用户退出
pub async fn run(path: Option<PathBuf>, executor: Executor, options: SessionOptions) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => match choose_file()? {
            Some(p) => p,
            None => return Ok(()),
        },
    };

    let mut session = Session::load(&path, executor, options)?;
    let formatter = ResponseFormatter::default();
    println!(
        "Loaded {} requests from {}",
        session.requests().len(),
        path.display().to_string().bold()
    );

    loop {
        let items = menu_items(&session);
        let Some(item) = cancellable(
            Select::new("Choose a request or action:", items)
                .with_page_size(15)
                .with_help_message("Enter to run, type to filter, Esc to quit")
                .prompt(),
        )?
        else {
            break;
        };

        debug!(choice = %item, "menu selection");
        match item {
            MenuItem::Request { index, .. } => {
                let label = session.resolved(index).map(|r| format!("{} {}", r.method, r.url))?;
                println!("\n{} {}", "→".cyan(), label);
                match session.execute(index).await {
                    Ok(response) => println!("{}\n", formatter.format(response)),
                    Err(e) => println!("{}: {}\n", "Error".red().bold(), e),
                }
            }
            MenuItem::Describe => {
                let choices = request_choices(&session);
                if choices.is_empty() {
                    continue;
                }
                let Some(choice) =
                    cancellable(Select::new("Describe which request?", choices).prompt())?
                else {
                    continue;
                };
                if let Some(request) = session.file().get_by_index(choice.index) {
                    println!("{}\n", describe_request(request));
                }
            }
            MenuItem::ShowVariables => print_variables(&session),
            MenuItem::SetVariable => {
                let Some(name) = cancellable(Text::new("Variable name:").prompt())? else {
                    continue;
                };
                let name = name.trim().to_string();
                if name.is_empty() {
                    continue;
                }
                let current = session
                    .effective_variables()
                    .get(&name)
                    .unwrap_or_default()
                    .to_string();
                if let Some(value) =
                    cancellable(Text::new("Value:").with_initial_value(&current).prompt())?
                {
                    session.set_variable(name, value);
                }
            }
            MenuItem::RemoveVariable => {
                let names: Vec<String> = session
                    .runtime_variables()
                    .keys()
                    .map(String::from)
                    .collect();
                if names.is_empty() {
                    println!("No runtime variables set\n");
                    continue;
                }
                if let Some(name) =
                    cancellable(Select::new("Remove which variable?", names).prompt())?
                {
                    session.remove_variable(&name);
                }
            }
            MenuItem::Reload => match session.reload() {
                Ok(()) => println!("Reloaded {} requests\n", session.requests().len()),
                Err(e) => println!("{}: {}\n", "Error".red().bold(), e),
            },
            MenuItem::Edit => {
                let choices = request_choices(&session);
                if choices.is_empty() {
                    continue;
                }
                let Some(choice) =
                    cancellable(Select::new("Edit which request?", choices).prompt())?
                else {
                    continue;
                };
                let editor = session.editor_command(choice.index)?;
                let status = Command::new(&editor.program).args(&editor.args).status();
                match status {
                    Ok(s) if s.success() => {
                        if let Err(e) = session.reload() {
                            println!("{}: {}\n", "Error".red().bold(), e);
                        }
                    }
                    Ok(s) => println!("{} exited with {}\n", editor.program, s),
                    Err(e) => println!("Failed to start {}: {}\n", editor.program, e),
                }
            }
            MenuItem::Quit => break,
        }
    }

    Ok(())
}

/// 请求详情：名称、方法、URL、描述和捕获规则
fn describe_request(request: &Request) -> String {
    let mut lines = Vec::new();
    if let Some(name) = &request.name {
        lines.push(name.clone());
    }
    lines.push(format!(
        "{} {} (line {})",
        request.method, request.url, request.source_line
    ));
    lines.push(
        request
            .description
            .clone()
            .unwrap_or_else(|| "(no description)".to_string()),
    );
    if !request.captures.is_empty() {
        let captures: Vec<String> = request
            .captures
            .iter()
            .map(|c| format!("{} = {}", c.variable_name, c.path))
            .collect();
        lines.push(format!("Captures: {}", captures.join(", ")));
    }
    lines.join("\n")
}

fn print_variables(session: &Session) {
    let variables = session.effective_variables();
    if variables.is_empty() {
        println!("No variables\n");
        return;
    }
    for (name, value) in variables.iter() {
        let marker = if session.runtime_variables().contains(name) {
            "*".yellow().to_string()
        } else {
            " ".to_string()
        };
        println!(" {} {} = {}", marker, name.cyan(), value);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use std::collections::HashMap;
    use std::time::Duration;

    fn session() -> Session {
        let file = parser::parse_content(
            "### Login\nPOST http://localhost/login\n\n###\nGET http://localhost/me\n",
        )
        .unwrap();
        let options = SessionOptions {
            env: Box::new(HashMap::<String, String>::new()),
            ..Default::default()
        };
        Session::from_file(file, Executor::new(Duration::from_secs(1)).unwrap(), options).unwrap()
    }

    #[test]
    fn test_menu_lists_requests_then_actions() {
        let items = menu_items(&session());
        assert_eq!(items.len(), 9);
        assert!(items.contains(&MenuItem::Describe));
        assert_eq!(
            items[0],
            MenuItem::Request {
                index: 1,
                display: " 1. POST http://localhost/login (Login)".to_string()
            }
        );
        assert_eq!(items[1].to_string(), " 2. GET http://localhost/me");
        assert_eq!(items.last(), Some(&MenuItem::Quit));
    }

    #[test]
    fn test_describe_request_shows_description() {
        let file = parser::parse_content(
            "### Login\n# Signs in the demo user\n# @capture token = $.token\nPOST http://localhost/login\n\n###\nGET http://localhost/me\n",
        )
        .unwrap();

        let text = describe_request(&file.requests[0]);
        assert_eq!(
            text,
            "Login\nPOST http://localhost/login (line 4)\nSigns in the demo user\nCaptures: token = $.token"
        );

        let text = describe_request(&file.requests[1]);
        assert_eq!(text, "GET http://localhost/me (line 7)\n(no description)");
    }

    #[test]
    fn test_cancelled_prompt_is_none() {
        let result: Result<Option<String>> = cancellable(Err(InquireError::OperationCanceled));
        assert!(result.unwrap().is_none());

        let result = cancellable(Ok(3));
        assert_eq!(result.unwrap(), Some(3));
    }
}
