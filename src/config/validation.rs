use crate::config::types::{BrowserSettings, Config, CrawlerConfig, FilesConfig};
use crate::ConfigError;

/// Upper bound on concurrent browser pages
pub const MAX_CONCURRENT_LIMIT: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_browser_settings(&config.browser)?;
    validate_files_config(&config.files)?;
    Ok(())
}

/// Validates crawler budget configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent < 1 || config.max_concurrent > MAX_CONCURRENT_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_concurrent must be between 1 and {}, got {}",
            MAX_CONCURRENT_LIMIT, config.max_concurrent
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.page_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "page_timeout_secs must be >= 1, got {}",
            config.page_timeout_secs
        )));
    }

    Ok(())
}

/// Validates browser settings
fn validate_browser_settings(settings: &BrowserSettings) -> Result<(), ConfigError> {
    if settings.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(executable) = &settings.executable {
        if executable.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "browser executable path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates file locations
fn validate_files_config(config: &FilesConfig) -> Result<(), ConfigError> {
    if config.patterns.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "patterns path cannot be empty".to_string(),
        ));
    }

    if config.output.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
