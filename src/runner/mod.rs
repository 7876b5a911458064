pub mod executor;
pub mod reporter;
pub mod session;
pub mod test_runner;
pub mod types;

pub use executor::Executor;
pub use reporter::TestReporter;
pub use session::{EditorCommand, Session, SessionOptions, discover_http_files};
pub use test_runner::TestRunner;
pub use types::{TestResult, TestSummary};
