use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub content_api_url: String,
    /// Bound on the question-generator call; failures map to ContentUnavailable.
    pub content_timeout_seconds: u64,
    /// Lobby sessions not started within this window age out to Expired.
    pub lobby_ttl_minutes: i64,
    /// How long Completed/Expired records linger before eviction.
    pub retention_minutes: i64,
    pub join_code_length: usize,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let content_api_url = settings
            .get_string("content_api.url")
            .or_else(|_| env::var("CONTENT_API_URL"))
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        let content_timeout_seconds = settings
            .get_int("content_api.timeout_seconds")
            .ok()
            .or_else(|| {
                env::var("CONTENT_API_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .filter(|v| *v > 0)
            .unwrap_or(10) as u64;

        let lobby_ttl_minutes = settings
            .get_int("sessions.lobby_ttl_minutes")
            .ok()
            .or_else(|| {
                env::var("LOBBY_TTL_MINUTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .filter(|v| *v > 0)
            .unwrap_or(30);

        let retention_minutes = settings
            .get_int("sessions.retention_minutes")
            .ok()
            .or_else(|| {
                env::var("SESSION_RETENTION_MINUTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .filter(|v| *v > 0)
            .unwrap_or(120);

        let join_code_length = settings
            .get_int("sessions.join_code_length")
            .ok()
            .or_else(|| {
                env::var("JOIN_CODE_LENGTH")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .filter(|v| (4..=8).contains(v))
            .unwrap_or(5) as usize;

        Ok(Config {
            bind_addr,
            content_api_url,
            content_timeout_seconds,
            lobby_ttl_minutes,
            retention_minutes,
            join_code_length,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0:8081".to_string(),
            content_api_url: "http://localhost:8000".to_string(),
            content_timeout_seconds: 10,
            lobby_ttl_minutes: 30,
            retention_minutes: 120,
            join_code_length: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.lobby_ttl_minutes > 0);
        assert!((4..=8).contains(&config.join_code_length));
    }
}
