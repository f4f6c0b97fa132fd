//! Settings of the `tally` binary.
//!
//! Read from `settings.toml` (optional) and then from `TALLY__*` environment
//! variables, e.g. `TALLY__SERVER__PORT=8080`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
    /// Origin allowed by CORS.
    pub frontend_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.database", "memory")?
            .set_default("server.frontend_url", "http://localhost:3000")?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("TALLY").prefix_separator("__").separator("__"))
            .build()?
            .try_deserialize()
    }
}
