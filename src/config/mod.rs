//! Configuration loading and management.

mod builder;
mod env;
mod error;
mod file;
mod resolve;
mod settings;
mod source;

pub use builder::Config;
pub use error::ConfigError;
pub use settings::Settings;
pub use source::{ConfigEntry, ConfigSource};
