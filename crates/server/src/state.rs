use std::sync::Arc;
use pricecheck_core::{Config, PriceChecker, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    checker: Arc<PriceChecker>,
}

impl AppState {
    pub fn new(config: Config, checker: Arc<PriceChecker>) -> Self {
        Self { config, checker }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn checker(&self) -> &PriceChecker {
        self.checker.as_ref()
    }
}
