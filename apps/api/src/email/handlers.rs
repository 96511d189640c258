//! Axum route handlers for the Email API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::email::classifier::classify;
use crate::email::extractor::extract_profile;
use crate::email::generator::{generate_email, EmailSource};
use crate::email::models::{
    Classification, ExtractedProfile, GeneratedEmail, GenerationRequest, Tone,
};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateEmailRequest {
    pub job_description: String,
    pub user_description: String,
    #[serde(default)]
    pub tone: Tone,
    /// Per-request opt-out of remote generation. Cannot enable it when the
    /// server has it disabled.
    #[serde(default)]
    pub use_ai: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct GenerateEmailResponse {
    pub email: GeneratedEmail,
    pub source: EmailSource,
    pub personalization_hits: usize,
    pub plain_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SignalsRequest {
    pub job_description: String,
    pub user_description: String,
}

#[derive(Debug, Serialize)]
pub struct SignalsResponse {
    pub profile: ExtractedProfile,
    pub classification: Classification,
}

#[derive(Debug, Serialize)]
pub struct ToneOption {
    pub value: Tone,
    pub label: &'static str,
    pub description: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/emails/generate
///
/// Remote generation when enabled, template engine otherwise or on failure.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateEmailRequest>,
) -> Result<Json<GenerateEmailResponse>, AppError> {
    validate_texts(&request.job_description, &request.user_description)?;

    let use_ai = state.config.use_ai && request.use_ai.unwrap_or(true);
    let generation = GenerationRequest {
        job_description: request.job_description,
        user_description: request.user_description,
        tone: request.tone,
    };

    let outcome = generate_email(
        state.completer.as_deref(),
        &state.catalog,
        state.picker.as_ref(),
        &generation,
        use_ai,
    )
    .await;

    let plain_text = outcome.email.to_plain_text();
    Ok(Json(GenerateEmailResponse {
        email: outcome.email,
        source: outcome.source,
        personalization_hits: outcome.personalization_hits,
        plain_text,
    }))
}

/// POST /api/v1/emails/signals
///
/// Previews the signals the template engine would use for these texts.
pub async fn handle_signals(
    Json(request): Json<SignalsRequest>,
) -> Result<Json<SignalsResponse>, AppError> {
    validate_texts(&request.job_description, &request.user_description)?;

    Ok(Json(SignalsResponse {
        profile: extract_profile(&request.user_description),
        classification: classify(&request.job_description, &request.user_description),
    }))
}

/// GET /api/v1/tones
pub async fn handle_list_tones() -> Json<Vec<ToneOption>> {
    Json(
        Tone::ALL
            .into_iter()
            .map(|tone| ToneOption {
                value: tone,
                label: tone.label(),
                description: tone.description(),
            })
            .collect(),
    )
}

fn validate_texts(job_description: &str, user_description: &str) -> Result<(), AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    if user_description.trim().is_empty() {
        return Err(AppError::Validation(
            "user_description cannot be empty".to_string(),
        ));
    }
    Ok(())
}
