use crate::config::types::{Config, CrawlerConfig, OutputConfig, SearchConfig, UserAgentConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the search section, including the resolved engine profile
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.query.trim().is_empty() {
        return Err(ConfigError::Validation("query cannot be empty".to_string()));
    }

    if config.regions.is_empty() {
        return Err(ConfigError::Validation(
            "at least one region is required".to_string(),
        ));
    }

    if config.regions.iter().any(|r| r.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "region codes cannot be empty".to_string(),
        ));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    let profile = config.profile();

    if profile.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            profile.page_size
        )));
    }

    if profile.offset(config.max_pages - 1).is_none() {
        return Err(ConfigError::Validation(format!(
            "page_size {} with max_pages {} overflows the result offset",
            profile.page_size, config.max_pages
        )));
    }

    validate_http_url(&profile.base_url, "base_url")?;
    validate_selector(&profile.results_selector)?;
    validate_selector(&profile.result_link_selector)?;
    validate_selector(&profile.next_page_selector)?;

    if profile.delay_min > profile.delay_max {
        return Err(ConfigError::Validation(format!(
            "search delay_min_ms ({}) exceeds delay_max_ms ({})",
            profile.delay_min.as_millis(),
            profile.delay_max.as_millis()
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth of 0 is allowed: seeds are recorded but never expanded

    if config.max_content_chars == Some(0) {
        return Err(ConfigError::Validation(
            "max_content_chars must be >= 1".to_string(),
        ));
    }

    if let Some(tags) = &config.removed_tags {
        if let Some(tag) = tags
            .iter()
            .find(|t| t.is_empty() || !t.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
        {
            return Err(ConfigError::Validation(format!(
                "removed_tags contains an invalid tag name '{}'",
                tag
            )));
        }
    }

    validate_selector(&config.readiness_selector)?;

    if config.page_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "page_timeout_ms must be >= 100ms, got {}ms",
            config.page_timeout_ms
        )));
    }

    if config.delay_min_ms > config.delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "crawler delay_min_ms ({}) exceeds delay_max_ms ({})",
            config.delay_min_ms, config.delay_max_ms
        )));
    }

    if config.seed_pause_min_ms > config.seed_pause_max_ms {
        return Err(ConfigError::Validation(format!(
            "seed_pause_min_ms ({}) exceeds seed_pause_max_ms ({})",
            config.seed_pause_min_ms, config.seed_pause_max_ms
        )));
    }

    for seed in &config.seeds {
        validate_http_url(seed, "seed URL")?;
    }

    if config.verification_marker.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "verification_marker cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.agents.is_empty() {
        return Err(ConfigError::Validation(
            "at least one user agent is required".to_string(),
        ));
    }

    if config.agents.iter().any(|a| a.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user agent strings cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.visited_path.is_empty() {
        return Err(ConfigError::Validation(
            "visited_path cannot be empty".to_string(),
        ));
    }

    if config.records_path.is_empty() {
        return Err(ConfigError::Validation(
            "records_path cannot be empty".to_string(),
        ));
    }

    if config.visited_path == config.records_path {
        return Err(ConfigError::Validation(
            "visited_path and records_path must differ".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a string is an absolute http(s) URL
fn validate_http_url(value: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            what, value
        )));
    }

    Ok(())
}

/// Checks that a string parses as a CSS selector
fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: e.to_string(),
        })
}
