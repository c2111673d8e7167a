//! Server configuration from the environment

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use catalog::CatalogConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
/// Upper bound for any configured lifetime (one year)
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

/// Everything `main` needs to start serving
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub mail_api_url: Option<String>,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            token_secret: token_secret()?,
            access_token_ttl: ttl_var("ACCESS_TOKEN_TTL_SECS", defaults.access_token_ttl)?,
            confirmation_code_ttl: ttl_var(
                "CONFIRMATION_CODE_TTL_SECS",
                defaults.confirmation_code_ttl,
            )?,
            forbidden_usernames: list_var("FORBIDDEN_USERNAMES", ""),
            mail_from: env::var("MAIL_FROM").unwrap_or(defaults.mail_from),
        };

        Ok(Self {
            database_url,
            database_max_connections: var_or("DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr: var_or("BIND_ADDR", DEFAULT_BIND_ADDR.parse()?)?,
            frontend_origins: list_var("FRONTEND_ORIGINS", DEFAULT_FRONTEND_ORIGINS),
            mail_api_url: env::var("MAIL_API_URL").ok().filter(|v| !v.trim().is_empty()),
            auth,
            catalog: CatalogConfig::default(),
        })
    }
}

/// Release builds require `TOKEN_SECRET`; debug builds fall back to a
/// random key, so tokens do not survive a restart
fn token_secret() -> anyhow::Result<[u8; 32]> {
    let Ok(secret_b64) = env::var("TOKEN_SECRET") else {
        if cfg!(debug_assertions) {
            tracing::warn!("TOKEN_SECRET not set, using a random key");
            return Ok(AuthConfig::with_random_secret().token_secret);
        }
        bail!("TOKEN_SECRET must be set in production");
    };

    let bytes =
        platform::crypto::from_base64(secret_b64.trim()).context("TOKEN_SECRET must be base64")?;
    let Ok(secret) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        bail!("TOKEN_SECRET must decode to 32 bytes, got {}", bytes.len());
    };
    Ok(secret)
}

fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

fn ttl_var(key: &str, default: Duration) -> anyhow::Result<Duration> {
    check_ttl(key, var_or(key, default.as_secs())?)
}

fn check_ttl(key: &str, secs: u64) -> anyhow::Result<Duration> {
    if secs == 0 || secs > MAX_TTL_SECS {
        bail!("{key} must be between 1 and {MAX_TTL_SECS} seconds, got {secs}");
    }
    Ok(Duration::from_secs(secs))
}

fn list_var(key: &str, default: &str) -> Vec<String> {
    split_list(&env::var(key).unwrap_or_else(|_| default.to_string()))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
