//! Environment-driven configuration shared by the storefront crates.
//!
//! Every config struct implements [`FromEnv`]; the helpers here turn a
//! missing or malformed variable into a [`ConfigError`] naming the key.

pub mod server;
pub mod tracing;

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Deployment environment, read from `APP_ENV`.
///
/// Selects log format and default filters in [`crate::tracing::init_tracing`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        if env_or_default("APP_ENV", "development").eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Name and version of the running binary, reported by health endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// Build an [`AppInfo`] from the calling crate's Cargo metadata.
#[macro_export]
macro_rules! app_info {
    () => {
        $crate::AppInfo {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    };
}

pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// First variable in `keys` that is set. The error lists all of them.
pub fn env_first_of(keys: &[&str]) -> Result<String, ConfigError> {
    keys.iter()
        .find_map(|key| env::var(key).ok())
        .ok_or_else(|| ConfigError::MissingEnvVar(keys.join(" or ")))
}

/// Parse `key` as `T`, falling back to `default` when unset.
///
/// A set but unparsable value is an error, never silently the default.
pub fn env_parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        for value in ["production", "PRODUCTION", "Production"] {
            temp_env::with_var("APP_ENV", Some(value), || {
                assert!(Environment::from_env().is_production());
            });
        }
    }

    #[test]
    fn test_environment_unknown_defaults_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_app_info_uses_package_metadata() {
        let info = app_info!();
        assert_eq!(info.name, "core_config");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_vars(
            [("STOREFRONT_SET", Some("value")), ("STOREFRONT_UNSET", None)],
            || {
                assert_eq!(env_or_default("STOREFRONT_SET", "default"), "value");
                assert_eq!(env_or_default("STOREFRONT_UNSET", "default"), "default");
            },
        );
    }

    #[test]
    fn test_env_required_missing_names_the_key() {
        temp_env::with_var_unset("MISSING_REQUIRED", || {
            let err = env_required("MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("MISSING_REQUIRED"));
        });
    }

    #[test]
    fn test_env_first_of_prefers_earlier_keys() {
        temp_env::with_vars(
            [("PRIMARY_URL", Some("a")), ("LEGACY_URL", Some("b"))],
            || assert_eq!(env_first_of(&["PRIMARY_URL", "LEGACY_URL"]).unwrap(), "a"),
        );
        temp_env::with_vars(
            [("PRIMARY_URL", None), ("LEGACY_URL", Some("b"))],
            || assert_eq!(env_first_of(&["PRIMARY_URL", "LEGACY_URL"]).unwrap(), "b"),
        );
    }

    #[test]
    fn test_env_first_of_lists_every_key_when_missing() {
        temp_env::with_vars_unset(["PRIMARY_URL", "LEGACY_URL"], || {
            let err = env_first_of(&["PRIMARY_URL", "LEGACY_URL"]).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Environment variable 'PRIMARY_URL or LEGACY_URL' is required but not set"
            );
        });
    }

    #[test]
    fn test_env_parse_or() {
        temp_env::with_var_unset("PAGE_SIZE", || {
            assert_eq!(env_parse_or("PAGE_SIZE", 6u64).unwrap(), 6);
        });
        temp_env::with_var("PAGE_SIZE", Some(" 12 "), || {
            assert_eq!(env_parse_or("PAGE_SIZE", 6u64).unwrap(), 12);
        });
        temp_env::with_var("PAGE_SIZE", Some("six"), || {
            let err = env_parse_or("PAGE_SIZE", 6u64).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "PAGE_SIZE"));
        });
    }
}
