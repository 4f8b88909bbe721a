/// Configuration management for the API server
///
/// Configuration comes from environment variables (a `.env` file is loaded
/// first when present).
///
/// # Environment Variables
///
/// - `API_HOST` / `API_PORT`: bind address (default `0.0.0.0:8080`)
/// - `CORS_ORIGINS`: comma separated allowed origins (default `*`)
/// - `API_PRODUCTION`: enables HSTS (default `false`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset runs in fallback mode
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default 10)
/// - `RUN_MIGRATIONS`: apply migrations at startup (default `true`)
/// - `SESSION_SECRET`: session signing key, at least 32 characters; a random
///   per-process key is used when unset
/// - `SESSION_TTL_HOURS`: session lifetime (default 12)
/// - `TRUST_IDENTITY_HEADERS`: honor `x-user-id` / `x-username` from callers
///   without a session token (default `true`)
/// - `REMINDER_ANONYMOUS_WRITES`: let anonymous callers edit and delete
///   reminders (default `true`)
///
/// # Example
///
/// ```no_run
/// use sitedesk_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sitedesk_shared::auth::session::DEFAULT_TTL_HOURS;
use std::env;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,

    /// `None` runs every handler in fallback mode
    pub database: Option<DatabaseConfig>,

    pub session: SessionConfig,

    pub access: AccessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode adds HSTS
    pub production: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Signing key for session tokens
    #[serde(skip_serializing)]
    pub secret: String,

    pub ttl_hours: i64,
}

/// How far unauthenticated callers are trusted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    pub trust_identity_headers: bool,
    pub reminder_anonymous_writes: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            trust_identity_headers: true,
            reminder_anonymous_writes: true,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cors_origins = get("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10)?,
                run_migrations: parse_flag(&get, "RUN_MIGRATIONS", true)?,
            }),
            None => None,
        };

        let secret = match get("SESSION_SECRET") {
            Some(secret) => {
                if secret.len() < 32 {
                    anyhow::bail!("SESSION_SECRET must be at least 32 characters long");
                }
                secret
            }
            None => {
                tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
                random_secret()
            }
        };

        let ttl_hours: i64 = parse_or(&get, "SESSION_TTL_HOURS", DEFAULT_TTL_HOURS)?;
        if ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }

        Ok(Self {
            api: ApiConfig {
                host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&get, "API_PORT", 8080)?,
                cors_origins,
                production: parse_flag(&get, "API_PRODUCTION", false)?,
            },
            database,
            session: SessionConfig { secret, ttl_hours },
            access: AccessConfig {
                trust_identity_headers: parse_flag(&get, "TRUST_IDENTITY_HEADERS", true)?,
                reminder_anonymous_writes: parse_flag(&get, "REMINDER_ANONYMOUS_WRITES", true)?,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Configuration for tests: no database, fixed secret, default access
    pub fn for_tests() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: None,
            session: SessionConfig {
                secret: "test-session-secret-at-least-32-bytes".to_string(),
                ttl_hours: DEFAULT_TTL_HOURS,
            },
            access: AccessConfig::default(),
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key}: {e}")),
        None => Ok(default),
    }
}

fn parse_flag<G>(get: &G, key: &str, default: bool) -> anyhow::Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => anyhow::bail!("Invalid {key}: expected a boolean, got {v:?}"),
    }
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}
