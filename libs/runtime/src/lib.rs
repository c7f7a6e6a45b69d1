//! Process-level plumbing shared by binaries: layered configuration, home
//! directory resolution and logging setup.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, AuthConfig, CliArgs, GeocoderConfig, LoggingConfig,
    Section, ServerConfig, StoreConfig,
};
pub use logging::init_logging_from_config;
