use secrecy::SecretString;
use std::env;
use std::str::FromStr;

use crate::access::GateConfig;
use crate::error::ConfigError;

/// Runtime configuration, read from the environment (and `.env` in development).
#[derive(Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    /// Secret used to sign session tokens.
    pub session_secret: SecretString,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub cors_allowed_origin: Option<String>,
    pub gate: GateConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = GateConfig::default();
        let gate = GateConfig {
            protected_prefix: var_or("PROTECTED_PREFIX", defaults.protected_prefix),
            login_path: var_or("LOGIN_PATH", defaults.login_path),
            dashboard_path: var_or("DASHBOARD_PATH", defaults.dashboard_path),
            exempt_prefixes: defaults.exempt_prefixes,
        };
        check_gate(&gate)?;

        Ok(Self {
            database_url: first_var(&["DATABASE_URL", "POSTGRES_URL"])
                .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            server_port: parse_var("SERVER_PORT", 8080)?,
            server_host: var_or("SERVER_HOST", "127.0.0.1".to_string()),
            session_secret: first_var(&["AUTH_SECRET", "JWT_SECRET"])
                .map(SecretString::from)
                .ok_or(ConfigError::Missing("AUTH_SECRET"))?,
            session_ttl_hours: parse_ttl()?,
            cookie_secure: parse_var("SESSION_COOKIE_SECURE", false)?,
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok(),
            gate,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|value| !value.is_empty()))
}

fn var_or(name: &str, default: String) -> String {
    env::var(name).unwrap_or(default)
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_ttl() -> Result<i64, ConfigError> {
    let hours: i64 = parse_var("SESSION_TTL_HOURS", 24)?;
    // Upper bound keeps the expiry well inside chrono's range.
    if !(1..=24 * 365).contains(&hours) {
        return Err(ConfigError::Invalid {
            name: "SESSION_TTL_HOURS",
            reason: format!("{} is outside 1..=8760", hours),
        });
    }
    Ok(hours)
}

/// Rejects gate paths that would make the redirects loop.
fn check_gate(gate: &GateConfig) -> Result<(), ConfigError> {
    if !gate.dashboard_path.starts_with(&gate.protected_prefix) {
        return Err(ConfigError::Invalid {
            name: "DASHBOARD_PATH",
            reason: format!("must start with {}", gate.protected_prefix),
        });
    }
    if gate.login_path.starts_with(&gate.protected_prefix) {
        return Err(ConfigError::Invalid {
            name: "LOGIN_PATH",
            reason: format!("must not start with {}", gate.protected_prefix),
        });
    }
    Ok(())
}
