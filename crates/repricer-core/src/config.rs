use crate::app_config::{AppConfig, Environment, ScrapeSettings, DEFAULT_CHUNK_SIZE};
use crate::ConfigError;

const DEFAULT_CATALOG_URL_TEMPLATE: &str =
    "https://www.net32.com/rest/neo/pdp/{mp_id}/vendor-options";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&or_default(var, default)).ok_or_else(|| {
            invalid(
                var,
                "expected one of true/false/1/0/yes/no".to_string(),
            )
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("REPRICER_ENV", "development"));
    let log_level = or_default("REPRICER_LOG_LEVEL", "info");
    let vendors_path = PathBuf::from(or_default(
        "REPRICER_VENDORS_PATH",
        "./config/vendors.yaml",
    ));

    let db_max_connections = parse_u32("REPRICER_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("REPRICER_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("REPRICER_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let catalog_url_template = or_default(
        "REPRICER_CATALOG_URL_TEMPLATE",
        DEFAULT_CATALOG_URL_TEMPLATE,
    );
    if !catalog_url_template.contains("{mp_id}") {
        return Err(invalid(
            "REPRICER_CATALOG_URL_TEMPLATE",
            "template must contain the {mp_id} placeholder".to_string(),
        ));
    }

    let scraper_request_timeout_secs = parse_u64("REPRICER_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "REPRICER_SCRAPER_USER_AGENT",
        "repricer/0.1 (competitive-scrape)",
    );
    let scraper_max_retries = parse_u32("REPRICER_SCRAPER_MAX_RETRIES", "0")?;
    let scraper_retry_backoff_base_ms =
        parse_u64("REPRICER_SCRAPER_RETRY_BACKOFF_BASE_MS", "1000")?;

    let scrape = ScrapeSettings {
        chunk_size: parse_positive_usize(
            "REPRICER_SCRAPE_CHUNK_SIZE",
            &DEFAULT_CHUNK_SIZE.to_string(),
        )?,
        concurrency: parse_positive_usize("REPRICER_SCRAPE_CONCURRENCY", "1")?,
        history_logging: parse_bool("REPRICER_HISTORY_LOGGING", "true")?,
        run_info_logging: parse_bool("REPRICER_RUN_INFO_LOGGING", "true")?,
    };

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        vendors_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        catalog_url_template,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
        scrape,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
