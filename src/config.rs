//! Runtime settings from the environment (and an optional .env file).

use crate::error::ConfigError;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/backoffice";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
    /// Shared secret for the bearer-token verifier. Required.
    pub jwt_secret: String,
    pub max_connections: u32,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            Err(_) => DEFAULT_PORT,
        };
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?;
        let max_connections = match std::env::var("MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "MAX_CONNECTIONS",
                value: raw,
            })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(ServerConfig {
            database_url,
            port,
            jwt_secret,
            max_connections,
        })
    }
}
