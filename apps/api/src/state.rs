use std::sync::Arc;

use crate::config::Config;
use crate::email::completion::EmailCompleter;
use crate::email::templates::{TemplateCatalog, TemplatePicker};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Remote generator. `None` when no API key is configured or AI is switched off.
    pub completer: Option<Arc<dyn EmailCompleter>>,
    /// Validated at startup; immutable afterwards.
    pub catalog: Arc<TemplateCatalog>,
    /// Default: RandomPicker. Tests pin selection with FixedPicker.
    pub picker: Arc<dyn TemplatePicker>,
    pub config: Config,
}
