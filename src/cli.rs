use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};
use tracing::warn;

use hrun::http::Client;
use hrun::parser::{self, HttpFile};
use hrun::runner::{Executor, SessionOptions, TestReporter, TestRunner, TestSummary};
use hrun::utils::{ResponseFormatter, parse_duration};
use hrun::variable::{
    Config, ConfigLoader, DotenvFile, EnvLookup, LayeredEnv, ProcessEnv, VariableSources,
};
use hrun::{HrunError, interactive};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 执行文件中的请求
    Run {
        file: PathBuf,

        /// 只执行该位置的请求（从 1 开始）
        #[arg(short, long, conflicts_with = "name")]
        request: Option<usize>,

        /// 只执行第一个同名请求
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        vars: VariableArgs,
    },

    /// 执行所有请求并报告成功与失败
    Test {
        file: PathBuf,

        #[command(flatten)]
        vars: VariableArgs,

        /// 打印所有响应，而不只是失败的
        #[arg(short, long)]
        verbose: bool,
    },

    /// 列出文件中的请求
    List { file: PathBuf },

    /// 交互式选择并执行请求
    #[command(alias = "tui")]
    Interactive {
        /// 请求文件；省略时从当前目录中选择
        file: Option<PathBuf>,

        #[command(flatten)]
        vars: VariableArgs,
    },
}

#[derive(Args, Debug, Default)]
pub struct VariableArgs {
    /// 用于覆盖文件变量的 dotenv 文件
    #[arg(long = "env", value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// hrun.toml 中的命名环境
    #[arg(short, long)]
    pub environment: Option<String>,

    /// 设置变量，优先于其他所有来源
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// 单个请求的超时时间，例如 500ms、30s、2m
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,
}

fn parse_var(s: &str) -> std::result::Result<(String, String), String> {
    ConfigLoader::parse_cli_var(s).ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

/// 运行前由命令行参数、配置文件和环境变量得到的设置
struct RunContext {
    config: Option<Config>,
    env: Box<dyn EnvLookup>,
    timeout: Duration,
}

impl RunContext {
    fn new(args: &VariableArgs) -> Result<Self> {
        let config = ConfigLoader::find_and_load()?;

        let env: Box<dyn EnvLookup> = match &args.env_file {
            Some(path) => match DotenvFile::load(path) {
                Ok(dotenv) => Box::new(LayeredEnv::new(ProcessEnv, dotenv)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read env file");
                    Box::new(ProcessEnv)
                }
            },
            None => Box::new(ProcessEnv),
        };

        let timeout = match (args.timeout, config.as_ref().and_then(|c| c.timeout.as_deref())) {
            (Some(t), _) => t,
            (None, Some(t)) => parse_duration(t)
                .map_err(|e| HrunError::Config(format!("timeout: {}", e)))?,
            (None, None) => Client::DEFAULT_TIMEOUT,
        };

        Ok(Self {
            config,
            env,
            timeout,
        })
    }

    fn load_file(&self, path: &Path, args: &VariableArgs) -> Result<HttpFile> {
        let mut file = parser::parse_file(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        file.variables = VariableSources {
            config: self.config.as_ref(),
            environment: args.environment.as_deref(),
            cli_vars: &args.vars,
        }
        .build(&file.variables, self.env.as_ref())?;
        Ok(file)
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            file,
            request,
            name,
            vars,
        } => run_requests(&file, request, name.as_deref(), &vars).await,
        Commands::Test {
            file,
            vars,
            verbose,
        } => run_tests(&file, &vars, verbose).await,
        Commands::List { file } => list_requests(&file),
        Commands::Interactive { file, vars } => {
            let context = RunContext::new(&vars)?;
            let options = SessionOptions {
                config: context.config,
                environment: vars.environment,
                cli_vars: vars.vars,
                env: context.env,
            };
            interactive::run(file, Executor::new(context.timeout)?, options).await?;
            Ok(())
        }
    }
}

async fn run_requests(
    path: &Path,
    index: Option<usize>,
    name: Option<&str>,
    args: &VariableArgs,
) -> Result<()> {
    let context = RunContext::new(args)?;
    let mut file = context.load_file(path, args)?;
    let executor = Executor::new(context.timeout)?;
    let formatter = ResponseFormatter::default();

    let single = match (index, name) {
        (_, Some(name)) => Some(executor.execute_named(&file, name).await?),
        (Some(index), None) => Some(executor.execute_index(&file, index).await?),
        (None, None) => None,
    };
    if let Some(response) = single {
        if let Some(error) = response.error {
            return Err(error.into());
        }
        println!("{}", formatter.format(&response));
        return Ok(());
    }

    let requests = file.requests.clone();
    let (responses, aborted) = match executor.execute_all(&mut file).await {
        Ok(responses) => (responses, None),
        Err(mut aborted) => (std::mem::take(&mut aborted.responses), Some(aborted)),
    };

    for (i, (request, response)) in requests.iter().zip(&responses).enumerate() {
        println!(
            "{}",
            format!("=== Request {}: {} {} ===", i + 1, request.method, request.url).bold()
        );
        if let Some(name) = &request.name {
            println!("Name: {}", name);
        }
        println!("{}\n", formatter.format(response));
    }

    match aborted {
        Some(aborted) => Err(aborted.into()),
        None => Ok(()),
    }
}

async fn run_tests(path: &Path, args: &VariableArgs, verbose: bool) -> Result<()> {
    let context = RunContext::new(args)?;
    let mut file = context.load_file(path, args)?;
    let runner = TestRunner::new(Executor::new(context.timeout)?);
    let reporter = TestReporter::new(verbose);

    reporter.print_header(&path.display().to_string(), file.requests.len());
    let results = runner
        .run_with(&mut file, |result| reporter.print_result(result))
        .await;
    let summary = TestSummary::from_results(&results);
    reporter.print_summary(&summary);

    if !summary.all_passed() {
        return Err(HrunError::TestsFailed {
            failed: summary.failed,
        }
        .into());
    }
    Ok(())
}

fn list_requests(path: &Path) -> Result<()> {
    let file =
        parser::parse_file(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if file.requests.is_empty() {
        println!("No requests found in {}", path.display());
        return Ok(());
    }
    println!("{}", request_table(&file));
    Ok(())
}

fn request_table(file: &HttpFile) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![
            "#",
            "Name",
            "Method",
            "URL",
            "Line",
            "Captures",
            "Description",
        ]);

    for (i, request) in file.requests.iter().enumerate() {
        let captures = request
            .captures
            .iter()
            .map(|c| c.variable_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(request.name.as_deref().unwrap_or("-")),
            Cell::new(request.method).fg(Color::Cyan),
            Cell::new(&request.url).add_attribute(Attribute::Dim),
            Cell::new(request.source_line),
            Cell::new(captures),
            Cell::new(request.description.as_deref().unwrap_or("-")),
        ]);
    }

    table
}
