use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Trade league is not empty
/// - Trade fetch limit is within 1..=10
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.trade.league.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "trade.league cannot be empty".to_string(),
        ));
    }

    if !(1..=10).contains(&config.trade.fetch_limit) {
        return Err(ConfigError::ValidationError(format!(
            "trade.fetch_limit must be between 1 and 10, got {}",
            config.trade.fetch_limit
        )));
    }

    Ok(())
}
