use std::{env, net::SocketAddr};

use thiserror::Error;

use crate::cookies::domain::CookieDomainEnv;
use crate::models::app::{AppName, Audience};
use crate::utils::jwt::{JwtKeys, JwtSecretError};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Secret(#[from] JwtSecretError),
    #[error("APP_NAME is invalid: {0}")]
    InvalidApp(String),
    #[error("AUTH_AUDIENCE is invalid: {0}")]
    InvalidAudience(String),
    #[error("BIND_ADDR '{0}' is not a socket address")]
    InvalidBindAddr(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app: Option<AppName>,
    pub audience: Audience,
    pub production: bool,
    pub bind_addr: SocketAddr,
    pub cookie_domain_override: Option<String>,
    pub cookie_env: CookieDomainEnv,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file

        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app = non_blank(lookup("APP_NAME"))
            .map(|name| {
                name.parse::<AppName>()
                    .map_err(|err| ConfigError::InvalidApp(err.to_string()))
            })
            .transpose()?;

        let audience = match non_blank(lookup("AUTH_AUDIENCE")) {
            Some(value) => value.parse::<Audience>().map_err(ConfigError::InvalidAudience)?,
            None => app.map(|app| app.default_audience()).unwrap_or(Audience::User),
        };

        let production = non_blank(lookup("APP_ENV"))
            .map(|v| v.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let bind_addr_raw =
            non_blank(lookup("BIND_ADDR")).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_addr_raw.clone()))?;

        Ok(Config {
            app,
            audience,
            production,
            bind_addr,
            cookie_domain_override: non_blank(lookup("AUTH_COOKIE_DOMAIN_OVERRIDE")),
            cookie_env: CookieDomainEnv::from_lookup(&lookup),
        })
    }

    /// Signing keys come from the environment separately so a missing
    /// secret can be reported on its own.
    pub fn jwt_keys_from_env() -> Result<JwtKeys, ConfigError> {
        Ok(JwtKeys::from_env()?)
    }
}
