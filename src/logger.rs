use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 通过环境变量 `RUST_LOG` 控制日志级别。
/// 默认级别：warn，避免日志混入命令输出。
///
/// 示例：
/// - RUST_LOG=debug hrun run api.http
/// - RUST_LOG=hrun::parser=trace hrun list api.http
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::debug!("Logger initialized");
}
