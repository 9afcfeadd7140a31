//! Handles settings for the application. Configuration is written in
//! `settings.toml`.
//!
//! See `settings.toml` for the configuration.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the env filter, e.g. `info`.
    pub level: String,
    /// Deployment profile; only `development` may run without a backend.
    pub profile: String,
}

#[derive(Debug, Deserialize)]
pub struct Backend {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct Demo {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub backend: Option<Backend>,
    pub demo: Option<Demo>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
