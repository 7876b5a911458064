pub mod client;
pub mod response;
pub mod types;

// 重新导出常用类型，方便使用
pub use client::Client;
pub use response::Response;
pub use types::Status;
