use crate::backend::SpreadsheetBackend;
use crate::backend::rest::RestBackend;
use crate::config::ServerConfig;
use std::sync::Arc;

pub struct AppState {
    config: Arc<ServerConfig>,
    backend: Arc<dyn SpreadsheetBackend>,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let backend = Arc::new(RestBackend::new(
            config.api_base_url.clone(),
            config.token.clone(),
        ));
        Self { config, backend }
    }

    /// Swap in an alternative backend, used by tests to script replies.
    pub fn new_with_backend(
        config: Arc<ServerConfig>,
        backend: Arc<dyn SpreadsheetBackend>,
    ) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn backend(&self) -> Arc<dyn SpreadsheetBackend> {
        self.backend.clone()
    }
}
