use crate::config::types::{Config, CrawlerConfig, OutputConfig, SeedEntry, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;
use url::Url;

const MAX_POOL_SIZE: usize = 64;
const MAX_PACING_MS: u64 = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_depth < 1 {
        return Err(ConfigError::Validation(
            "max_depth must be >= 1, a depth of 0 visits nothing".to_string(),
        ));
    }

    if config.pool_size < 1 || config.pool_size > MAX_POOL_SIZE {
        return Err(ConfigError::Validation(format!(
            "pool_size must be between 1 and {}, got {}",
            MAX_POOL_SIZE, config.pool_size
        )));
    }

    if config.pacing_ms > MAX_PACING_MS {
        return Err(ConfigError::Validation(format!(
            "pacing_ms must be <= {}ms, got {}ms",
            MAX_PACING_MS, config.pacing_ms
        )));
    }

    if config.shutdown_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "shutdown_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates seed entries
fn validate_seeds(seeds: &[SeedEntry]) -> ConfigResult<()> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[seed]] is required".to_string(),
        ));
    }

    let mut worker_ids = HashSet::new();
    for (index, seed) in seeds.iter().enumerate() {
        let url = Url::parse(&seed.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use an HTTP or HTTPS scheme",
                seed.url
            )));
        }

        let worker_id = seed.worker_id.unwrap_or(index + 1);
        if !worker_ids.insert(worker_id) {
            return Err(ConfigError::Validation(format!(
                "worker id {} is used by more than one seed",
                worker_id
            )));
        }
    }

    Ok(())
}
