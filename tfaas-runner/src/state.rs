//! Shared application state.

use std::sync::Arc;

use crate::config::Config;
use crate::model::ModelRegistry;
use crate::service::Classifier;

/// Shared application state passed to all handlers.
pub struct AppState {
    pub config: Config,
    pub registry: Arc<ModelRegistry>,
    pub classifier: Classifier,
}

impl AppState {
    pub fn new(config: Config, registry: Arc<ModelRegistry>) -> Self {
        let classifier = Classifier::new(
            Arc::clone(&registry),
            config.models.default_model.clone(),
            config.runner.request_timeout(),
        );
        Self {
            config,
            registry,
            classifier,
        }
    }
}
