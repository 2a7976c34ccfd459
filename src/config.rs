// src/config.rs
//
// Environment-only configuration. The Fulltrack credentials are required:
// no baked-in defaults, and startup fails before binding when either is
// absent.

use anyhow::{anyhow, Context, Result};

pub const ENV_API_KEY: &str = "FULLTRACK_API_KEY";
pub const ENV_SECRET_KEY: &str = "FULLTRACK_SECRET_KEY";
pub const ENV_BASE_URL: &str = "FULLTRACK_BASE_URL";
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_BASE_URL: &str = "https://ws.fulltrack2.com";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub api_key: String,
    pub secret_key: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = require(ENV_API_KEY)?;
        let secret_key = require(ENV_SECRET_KEY)?;

        let base_url = std::env::var(ENV_BASE_URL)
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let port = match std::env::var(ENV_PORT) {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("{ENV_PORT} must be a port number, got {raw:?}"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            base_url,
            api_key,
            secret_key,
            port,
        })
    }
}

fn require(name: &str) -> Result<String> {
    let value =
        std::env::var(name).map_err(|_| anyhow!("Missing {name} env var (no default)"))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{name} is set but empty"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn clear_env() {
        for key in [ENV_API_KEY, ENV_SECRET_KEY, ENV_BASE_URL, ENV_PORT] {
            env::remove_var(key);
        }
    }

    #[serial_test::serial]
    #[test]
    fn missing_api_key_fails_fast() {
        clear_env();
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_API_KEY));
    }

    #[serial_test::serial]
    #[test]
    fn missing_secret_key_fails_fast() {
        clear_env();
        env::set_var(ENV_API_KEY, "key");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_SECRET_KEY));
        clear_env();
    }

    #[serial_test::serial]
    #[test]
    fn empty_credential_is_rejected() {
        clear_env();
        env::set_var(ENV_API_KEY, "   ");
        env::set_var(ENV_SECRET_KEY, "secret");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_API_KEY));
        clear_env();
    }

    #[serial_test::serial]
    #[test]
    fn defaults_apply_when_optional_vars_absent() {
        clear_env();
        env::set_var(ENV_API_KEY, "key");
        env::set_var(ENV_SECRET_KEY, "secret");
        let cfg = AppConfig::from_env().expect("config loads");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.port, DEFAULT_PORT);
        clear_env();
    }

    #[serial_test::serial]
    #[test]
    fn overrides_win_and_trailing_slash_is_trimmed() {
        clear_env();
        env::set_var(ENV_API_KEY, "key");
        env::set_var(ENV_SECRET_KEY, "secret");
        env::set_var(ENV_BASE_URL, "http://localhost:9099/");
        env::set_var(ENV_PORT, "8080");
        let cfg = AppConfig::from_env().expect("config loads");
        assert_eq!(cfg.base_url, "http://localhost:9099");
        assert_eq!(cfg.port, 8080);
        clear_env();
    }

    #[serial_test::serial]
    #[test]
    fn unparseable_port_is_an_error() {
        clear_env();
        env::set_var(ENV_API_KEY, "key");
        env::set_var(ENV_SECRET_KEY, "secret");
        env::set_var(ENV_PORT, "not-a-port");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
        clear_env();
    }
}
