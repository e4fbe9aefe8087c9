pub mod config;
pub mod types;
pub mod validation;

pub use config::{AppConfig, load_config};
pub use types::{Cli, Command};
