use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Prefix of environment overrides, e.g. `TEAM_PULSE__JWT__ACCESS_SECRET`.
pub const ENV_PREFIX: &str = "TEAM_PULSE";

use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::Role;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    pub bootstrap: Option<BootstrapConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Signing secrets. Length and distinctness are checked when the token
/// factory is built.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    #[serde(default = "default_password_cost")]
    pub cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            cost: default_password_cost(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionsConfig {
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

/// Account seeded into the in-memory store at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapConfig {
    pub email: EmailAddress,
    pub password: String,
    #[serde(default = "default_bootstrap_role")]
    pub role: Role,
}

fn default_password_cost() -> u32 {
    12
}

fn default_purge_interval_secs() -> u64 {
    3600
}

fn default_bootstrap_role() -> Role {
    Role::SuperAdmin
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (TEAM_PULSE__JWT__ACCESS_SECRET, TEAM_PULSE__SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(environment())
            .build()?;

        configuration.try_deserialize()
    }
}

/// Environment source: `TEAM_PULSE__JWT__ACCESS_SECRET=...` overrides `jwt.access_secret`.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}
