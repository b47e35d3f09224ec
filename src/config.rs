//! Runtime configuration read from the environment (after `dotenv` has loaded
//! any `.env` file).

use std::env;
use std::str::FromStr;

use crate::services::pagination::{PaginationConfig, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres {
        url: String,
        max_connections: u32,
        run_migrations: bool,
    },
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub pagination: PaginationConfig,
    /// `*` or a comma separated list of allowed origins.
    pub cors_origin: String,
    /// Path every route is mounted under, `""` or e.g. `/api`.
    pub api_prefix: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        AppConfig::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", 8080_u16)?;

        let store = match lookup("EMPLOYEE_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreBackend::Postgres {
                url: lookup("DATABASE_URL")
                    .filter(|url| !url.trim().is_empty())
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5_u32)?,
                run_migrations: parse_bool_or(&lookup, "RUN_MIGRATIONS", true)?,
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "EMPLOYEE_STORE",
                    value: other.to_string(),
                })
            }
        };

        let max_limit = parse_or(&lookup, "MAX_PAGE_LIMIT", MAX_LIMIT)?;
        if max_limit < 1 {
            return Err(ConfigError::Invalid {
                name: "MAX_PAGE_LIMIT",
                value: max_limit.to_string(),
            });
        }
        let default_limit = parse_or(&lookup, "DEFAULT_PAGE_LIMIT", DEFAULT_LIMIT.min(max_limit))?;
        if !(1..=max_limit).contains(&default_limit) {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_PAGE_LIMIT",
                value: default_limit.to_string(),
            });
        }

        let cors_origin = lookup("CORS_ORIGIN")
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .unwrap_or_else(|| "*".to_string());
        let api_prefix = normalize_prefix(lookup("API_PREFIX").as_deref().unwrap_or(""))?;

        Ok(AppConfig {
            host,
            port,
            store,
            cors_origin,
            api_prefix,
            pagination: PaginationConfig {
                default_page: DEFAULT_PAGE,
                default_limit,
                max_limit,
            },
        })
    }
}

/// `"api/"` becomes `"/api"`; blank means no prefix.
fn normalize_prefix(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.contains(|c: char| c.is_whitespace() || matches!(c, '{' | '}' | '?' | '#')) {
        return Err(ConfigError::Invalid {
            name: "API_PREFIX",
            value: raw.to_string(),
        });
    }
    Ok(format!("/{}", trimmed))
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

fn parse_bool_or<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).as_deref().map(str::trim) {
        None => Ok(default),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            name,
            value: other.to_string(),
        }),
    }
}
