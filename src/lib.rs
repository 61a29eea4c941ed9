pub mod config;
pub mod context;
pub mod dump;
mod error;
pub mod halt;
pub mod json;
pub mod loader;
pub mod mime;
pub mod paths;
pub mod request;
pub mod route;

pub use config::{Config, ConfigError, Settings};
pub use context::{config, config_all, set_config, AppContext, AppContextBuilder};
pub use error::Error;
pub use halt::Halt;
pub use loader::{Loader, NamespaceLoader};
pub use paths::Paths;
pub use request::Request;
pub use route::{route, Route};
