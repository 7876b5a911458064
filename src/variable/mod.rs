pub mod capture;
pub mod config;
pub mod env;
pub mod resolver;
pub mod types;

pub use capture::capture_variables;
pub use config::{ConfigLoader, VariableSources};
pub use env::{DotenvFile, EnvLookup, LayeredEnv, ProcessEnv};
pub use resolver::VariableResolver;
pub use types::{Config, Environment, Variables};
