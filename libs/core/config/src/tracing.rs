use crate::{env_or_default, Environment};
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Overrides the format picked from the environment (`json` or `pretty`).
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// How log events are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One flattened JSON object per event, for log shipping.
    Json,
    /// Multi-line human readable output.
    Pretty,
}

impl LogFormat {
    /// JSON in production, pretty elsewhere, unless `LOG_FORMAT` says otherwise.
    pub fn for_environment(environment: &Environment) -> Self {
        let fallback = if environment.is_production() { "json" } else { "pretty" };
        match env_or_default(LOG_FORMAT_VAR, fallback).to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Filter directives used when `RUST_LOG` is unset.
///
/// Production keeps the driver at `warn`; development traces the query
/// translator so every search/filter/paginate step is visible.
pub fn default_directives(environment: &Environment) -> &'static str {
    if environment.is_production() {
        "info,tower_http=info,mongodb=warn"
    } else {
        "debug,query_filter=trace,hyper=info,mongodb=info"
    }
}

/// Install the color-eyre panic and report hooks.
///
/// Call first thing in `main`. A second call is a no-op.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Set up the global subscriber with an [`tracing_error::ErrorLayer`] so
/// eyre reports carry span traces.
///
/// `RUST_LOG` wins over [`default_directives`]. Calling this again after a
/// subscriber is installed only logs at debug level, which keeps tests that
/// share a process quiet.
pub fn init_tracing(environment: &Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(environment)));
    let format = LogFormat::for_environment(environment);

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init(),
    };

    match result {
        Ok(()) => info!(?environment, ?format, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_follows_environment() {
        temp_env::with_var(LOG_FORMAT_VAR, None::<&str>, || {
            assert_eq!(LogFormat::for_environment(&Environment::Production), LogFormat::Json);
            assert_eq!(LogFormat::for_environment(&Environment::Development), LogFormat::Pretty);
        });
    }

    #[test]
    fn test_format_override() {
        temp_env::with_var(LOG_FORMAT_VAR, Some("JSON"), || {
            assert_eq!(LogFormat::for_environment(&Environment::Development), LogFormat::Json);
        });
        temp_env::with_var(LOG_FORMAT_VAR, Some("pretty"), || {
            assert_eq!(LogFormat::for_environment(&Environment::Production), LogFormat::Pretty);
        });
    }

    #[test]
    fn test_default_directives_quiet_the_driver_in_production() {
        assert!(default_directives(&Environment::Production).contains("mongodb=warn"));
        assert!(default_directives(&Environment::Development).contains("query_filter=trace"));
    }

    #[test]
    fn test_init_tracing_twice_does_not_panic() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            init_tracing(&Environment::Development);
            init_tracing(&Environment::Production);
        });
    }
}
