//! YAML configuration: parsing, secret resolution, per-algorithm
//! validation, and polling hot-reload (§3, §6, §9).

mod error;
mod loader;
mod model;
mod watcher;

pub use error::ConfigError;
pub use loader::{load_from_file, parse_and_validate, F5Config, RuntimeConfig};
pub use watcher::run as run_config_watcher;
