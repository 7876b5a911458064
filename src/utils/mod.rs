pub mod duration;
pub mod formatter;

pub use duration::parse_duration;
pub use formatter::{ResponseFormat, ResponseFormatter, format_body};
