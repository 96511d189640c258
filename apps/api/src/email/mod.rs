// Email generation engine.
// Implements: signal extraction, role/field classification, template catalog,
// placeholder personalization, remote completion with template fallback.
// All remote calls go through llm_client via the EmailCompleter seam.

pub mod classifier;
pub mod completion;
pub mod extractor;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod personalizer;
pub mod prompts;
pub mod templates;
