use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Which store implementation backs the API. `Memory` keeps everything in
/// process for demos and tests; `Postgres` is the durable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(Error::Config(format!(
                "Invalid STORE_BACKEND: {} (expected postgres or memory)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub store_backend: StoreBackend,
    /// Required only when `store_backend` is `Postgres`.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl_secs: i64,
    pub google_client_id: Option<String>,
    pub client_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Postgres,
        };

        let database_url = match store_backend {
            StoreBackend::Postgres => Some(get_env("DATABASE_URL")?),
            StoreBackend::Memory => env::var("DATABASE_URL").ok(),
        };

        Ok(Self {
            server_address: env::var("SERVER_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:5000".to_string()),
            store_backend,
            database_url,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_ttl_secs: match env::var("JWT_TTL_SECS") {
                Ok(raw) => parse_env("JWT_TTL_SECS", &raw)?,
                Err(_) => 60 * 60 * 24,
            },
            google_client_id: env::var("GOOGLE_CLIENT_ID").ok(),
            client_origin: env::var("CLIENT_ORIGIN").ok(),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}
