pub mod error;
pub mod http;
pub mod interactive;
pub mod logger;
pub mod parser;
pub mod runner;
pub mod utils;
pub mod variable;

// 重新导出常用类型
pub use error::{HrunError, Result, SequenceAborted, TransportError};
pub use http::Response;
pub use parser::{CaptureRule, Headers, HttpFile, Method, Request};
pub use runner::Executor;
pub use variable::Variables;
