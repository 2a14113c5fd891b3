//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Environment-driven settings for retry policy, database connection, and the HTTP/exchange
// surfaces, each with a typed default applied when the corresponding variable is absent.
//--------------------------------------------------------------------------------------------------

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

const MAX_RETRIES: &str = "MAX_RETRIES";
const RETRY_DELAY: &str = "RETRY_DELAY";
const DB_HOST: &str = "DB_HOST";
const DB_USER: &str = "DB_USER";
const DB_PASSWORD: &str = "DB_PASSWORD";
const DB_NAME: &str = "DB_NAME";
const API_PORT: &str = "API_PORT";
const EXCHANGE_URL: &str = "EXCHANGE_URL";

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_SECS: f64 = 5.0;
const DEFAULT_API_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct Config {
    /// Upper bound on transient-placement replacements per order.
    pub max_retries: u32,
    /// Sleep between retry attempts.
    pub retry_delay: Duration,
    pub db_host: String,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    /// Bind port for the axum HTTP surface.
    pub api_port: u16,
    /// Upstream placement endpoint for `HttpExchangeClient`.
    pub exchange_url: String,
}

impl Config {
    /// Reads settings from the process environment, loading a local `.env` first if
    /// present.
    pub fn from_env() -> Self {
        dotenv().ok();

        let max_retries = env::var(MAX_RETRIES)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);

        let retry_delay_secs: f64 = env::var(RETRY_DELAY)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETRY_DELAY_SECS);

        let api_port = env::var(API_PORT)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_API_PORT);

        Self {
            max_retries,
            retry_delay: Duration::from_secs_f64(retry_delay_secs.max(0.0)),
            db_host: env::var(DB_HOST).unwrap_or_else(|_| "localhost".to_string()),
            db_user: env::var(DB_USER).unwrap_or_else(|_| "postgres".to_string()),
            db_password: env::var(DB_PASSWORD).unwrap_or_else(|_| String::new()),
            db_name: env::var(DB_NAME).unwrap_or_else(|_| "matching_engine".to_string()),
            api_port,
            exchange_url: env::var(EXCHANGE_URL)
                .unwrap_or_else(|_| "http://localhost:9000/orders".to_string()),
        }
    }

    /// Assembles a Postgres connection string from the four `DB_*` keys.
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}/{}",
            self.db_user, self.db_password, self.db_host, self.db_name
        )
    }
}
