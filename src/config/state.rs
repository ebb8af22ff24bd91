// Application state module
// Immutable per-process state shared by every connection task

use std::sync::Arc;

use super::types::Config;
use crate::document::JsonDocument;

/// Application state
pub struct AppState {
    pub config: Config,
    pub document: JsonDocument,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            document: JsonDocument::new(&config.document.path, config.document.read_timeout()),
        }
    }

    pub fn shared(config: &Config) -> Arc<Self> {
        Arc::new(Self::new(config))
    }
}
