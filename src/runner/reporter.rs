use crate::runner::types::{TestResult, TestSummary};
use crate::utils::{ResponseFormat, ResponseFormatter};
use colored::Colorize;

pub struct TestReporter {
    verbose: bool,
    formatter: ResponseFormatter,
}

impl TestReporter {
    pub fn new(verbose: bool) -> Self {
        let format = if verbose {
            ResponseFormat::Verbose
        } else {
            ResponseFormat::Compact
        };

        Self {
            verbose,
            formatter: ResponseFormatter::new(format),
        }
    }

    /// 打印一行结果，失败或 verbose 时附带详情
    pub fn print_result(&self, result: &TestResult) {
        let symbol = if result.success {
            "✓".green()
        } else {
            "✗".red()
        };

        let name_part = match &result.name {
            Some(name) => format!(" {} -", name),
            None => String::new(),
        };

        println!(
            " {} [{}]{} {} {} ({}ms)",
            symbol,
            result.request_number,
            name_part,
            result.method.cyan(),
            result.url,
            result.duration.as_millis()
        );

        if !self.verbose && result.success {
            return;
        }

        // 构建失败没有响应，只有错误信息
        match &result.response {
            Some(response) => {
                for line in self.formatter.format(response).lines() {
                    println!("   {}", line);
                }
                println!();
            }
            None => {
                if let Some(error) = &result.error {
                    println!("   {}: {}", "Error".red().bold(), error);
                    println!();
                }
            }
        }
    }

    pub fn print_header(&self, file_path: &str, total: usize) {
        println!(
            "\nRunning {} requests from {}...\n",
            total,
            file_path.bold()
        );
    }

    pub fn print_summary(&self, summary: &TestSummary) {
        println!("\n{}", "━".repeat(50));
        println!("{}", "Summary".bold());
        println!("{}", "━".repeat(50));

        if summary.all_passed() {
            println!(
                "  {}: {} passed, {} total",
                "Tests".bold(),
                summary.passed.to_string().green(),
                summary.total
            );
        } else {
            println!(
                "  {}: {} passed, {} failed, {} total",
                "Tests".bold(),
                summary.passed.to_string().green(),
                summary.failed.to_string().red(),
                summary.total
            );
        }

        println!(
            "  {}: {:.3}s",
            "Duration".bold(),
            summary.total_duration.as_secs_f64()
        );
        println!();
    }
}

impl Default for TestReporter {
    fn default() -> Self {
        Self::new(false)
    }
}
