//! Configuration module for the Switchyard runtime.
//!
//! Settings are layered with figment from defaults, TOML/YAML files and
//! `SWITCHYARD_*` environment variables, then validated.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    DispatcherConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, SpanEventConfig,
    SwitchyardConfig,
};
pub use validation::validate_config;
