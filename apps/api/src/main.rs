mod config;
mod email;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::email::completion::{EmailCompleter, LlmEmailCompleter};
use crate::email::templates::{RandomPicker, TemplateCatalog};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_directive(&config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pitchmail API v{}", env!("CARGO_PKG_VERSION"));

    // Load and validate the template catalog; a bad catalog aborts startup
    let catalog = load_catalog(&config)?;
    info!("Template catalog loaded ({} templates)", catalog.len());

    // Initialize remote completion (optional)
    let completer = build_completer(&config)?;

    // Build app state
    let state = AppState {
        completer,
        catalog: Arc::new(catalog),
        picker: Arc::new(RandomPicker),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Filter directive used when `RUST_LOG` is unset. Targets are module paths,
/// which start with the crate name (`pitchmail`), not the package name.
fn default_log_directive(level: &str) -> String {
    format!("{}={}", env!("CARGO_CRATE_NAME"), level)
}

fn load_catalog(config: &Config) -> Result<TemplateCatalog> {
    match &config.template_catalog_path {
        Some(path) => TemplateCatalog::from_path(Path::new(path))
            .with_context(|| format!("Failed to load template catalog from '{path}'")),
        None => TemplateCatalog::embedded().context("Embedded template catalog is invalid"),
    }
}

/// Constructs the remote completer, or `None` when AI generation is unavailable.
fn build_completer(config: &Config) -> Result<Option<Arc<dyn EmailCompleter>>> {
    let Some(api_key) = config.openai_api_key.clone().filter(|_| config.use_ai) else {
        if config.use_ai {
            warn!("OPENAI_API_KEY not set; all emails will use templates");
        } else {
            info!("USE_AI=false; all emails will use templates");
        }
        return Ok(None);
    };

    let mut llm = LlmClient::new(
        api_key,
        config.openai_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )
    .context("Failed to build LLM HTTP client")?;
    if let Some(url) = &config.openai_api_url {
        llm = llm.with_endpoint(url.clone());
    }
    info!("LLM client initialized (model: {})", llm.model());

    Ok(Some(Arc::new(LlmEmailCompleter(llm))))
}
