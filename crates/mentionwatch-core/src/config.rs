use crate::app_config::{AppConfig, SourceToggles};
use crate::policy::{SentimentThresholds, SpikePolicy};
use crate::ConfigError;

/// Upper bound on a single adapter request.
const MAX_SOURCE_TIMEOUT_SECS: u64 = 10;

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
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::str::FromStr;

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

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = f64::from_str(raw.trim()).map_err(|e| invalid(var, e.to_string()))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(invalid(var, "must be a finite number".to_string()))
        }
    };

    let parse_flag = |var: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, "true");
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    // Empty strings count as "not configured" so a blank line in .env
    // disables the source instead of sending an empty credential.
    let optional_secret = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let database_url = require("DATABASE_URL")?;

    let bind_addr = parse("MENTIONWATCH_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("MENTIONWATCH_LOG_LEVEL", "info");
    let brands_path = PathBuf::from(or_default(
        "MENTIONWATCH_BRANDS_PATH",
        "./config/brands.yaml",
    ));

    let db_max_connections = parse_u32("MENTIONWATCH_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("MENTIONWATCH_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_num("MENTIONWATCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let monitor_interval_secs = parse_num("MENTIONWATCH_MONITOR_INTERVAL_SECS", "600")?;
    if monitor_interval_secs == 0 {
        return Err(invalid(
            "MENTIONWATCH_MONITOR_INTERVAL_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let source_timeout_secs = parse_num("MENTIONWATCH_SOURCE_TIMEOUT_SECS", "10")?;
    if source_timeout_secs == 0 || source_timeout_secs > MAX_SOURCE_TIMEOUT_SECS {
        return Err(invalid(
            "MENTIONWATCH_SOURCE_TIMEOUT_SECS",
            format!("must be between 1 and {MAX_SOURCE_TIMEOUT_SECS}"),
        ));
    }

    let user_agent = or_default("MENTIONWATCH_USER_AGENT", "mentionwatch/0.1 (brand-monitor)");

    let max_concurrent_brands = usize::try_from(parse_num("MENTIONWATCH_MAX_CONCURRENT_BRANDS", "4")?)
        .map_err(|e| invalid("MENTIONWATCH_MAX_CONCURRENT_BRANDS", e.to_string()))?;
    if max_concurrent_brands == 0 {
        return Err(invalid(
            "MENTIONWATCH_MAX_CONCURRENT_BRANDS",
            "must be at least 1".to_string(),
        ));
    }

    let sources = SourceToggles {
        twitter: parse_flag("MENTIONWATCH_TWITTER_ENABLED")?,
        reddit: parse_flag("MENTIONWATCH_REDDIT_ENABLED")?,
        news: parse_flag("MENTIONWATCH_NEWS_ENABLED")?,
    };

    let twitter_bearer_token = optional_secret("TWITTER_BEARER_TOKEN");
    let news_api_key = optional_secret("NEWS_API_KEY");

    let sentiment_thresholds = SentimentThresholds {
        positive: parse_f64("MENTIONWATCH_SENTIMENT_POSITIVE_THRESHOLD", "0.2")?,
        negative: parse_f64("MENTIONWATCH_SENTIMENT_NEGATIVE_THRESHOLD", "-0.2")?,
    };
    if sentiment_thresholds.negative > sentiment_thresholds.positive {
        return Err(invalid(
            "MENTIONWATCH_SENTIMENT_NEGATIVE_THRESHOLD",
            "must not exceed the positive threshold".to_string(),
        ));
    }

    let spike_multiplier = parse_f64("MENTIONWATCH_SPIKE_MULTIPLIER", "2.0")?;
    if spike_multiplier <= 0.0 {
        return Err(invalid(
            "MENTIONWATCH_SPIKE_MULTIPLIER",
            "must be greater than zero".to_string(),
        ));
    }
    let spike_policy = SpikePolicy {
        multiplier: spike_multiplier,
        floor: parse_num("MENTIONWATCH_SPIKE_FLOOR", "10")?,
    };

    Ok(AppConfig {
        database_url,
        bind_addr,
        log_level,
        brands_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        monitor_interval_secs,
        source_timeout_secs,
        user_agent,
        max_concurrent_brands,
        sources,
        twitter_bearer_token,
        news_api_key,
        sentiment_thresholds,
        spike_policy,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
