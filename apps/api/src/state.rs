use std::sync::Arc;

use crate::llm_client::TextGenerator;
use crate::questionnaire::catalog::Catalog;
use crate::questionnaire::session::SessionRegistry;
use crate::share::ShareStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when `ANTHROPIC_API_KEY` is unset; generate endpoints then answer 500.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub shares: Arc<dyn ShareStore>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        shares: Arc<dyn ShareStore>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            generator,
            shares,
            sessions: SessionRegistry::new(catalog),
        }
    }

    /// Built-in catalog, in-memory shares.
    #[cfg(test)]
    pub fn in_memory(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self::new(
            generator,
            Arc::new(crate::share::MemoryShareStore::new()),
            Arc::new(Catalog::builtin().expect("built-in catalog is valid")),
        )
    }
}
