use axum_helpers::JwtConfig;
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse_or, server::ServerConfig};
use database::mongodb::MongoConfig;
use std::time::Duration;

pub use core_config::Environment;

const DEFAULT_TOKEN_SWEEP_INTERVAL_SECS: u64 = 3600;

/// Application configuration, composed from the shared config components.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub environment: Environment,
    /// How often the background sweeper purges expired tokens
    pub token_sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            jwt,
            environment,
            token_sweep_interval: token_sweep_interval()?,
        })
    }
}

/// `TOKEN_SWEEP_INTERVAL_SECS`, default 3600. Zero is rejected.
fn token_sweep_interval() -> Result<Duration, ConfigError> {
    let secs = env_parse_or("TOKEN_SWEEP_INTERVAL_SECS", DEFAULT_TOKEN_SWEEP_INTERVAL_SECS)?;
    if secs == 0 {
        return Err(ConfigError::ParseError {
            key: "TOKEN_SWEEP_INTERVAL_SECS".to_string(),
            details: "must be positive".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
