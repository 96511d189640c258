//! Email Generation: orchestrates remote completion with template fallback.
//!
//! Flow: build prompt → remote completer (if enabled) → on any failure:
//!       classify → extract signals → pick template → personalize.
//!
//! The template path is total: it never fails, whatever the input text.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::email::classifier::classify;
use crate::email::completion::EmailCompleter;
use crate::email::extractor::extract_profile;
use crate::email::models::{GeneratedEmail, GenerationRequest};
use crate::email::personalizer::personalize;
use crate::email::prompts::build_generation_prompt;
use crate::email::templates::{TemplateCatalog, TemplatePicker};

/// Words at or below this many characters are ignored by the personalization check.
const MIN_MATCHED_WORD_CHARS: usize = 4;

/// Which path produced the email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailSource {
    Remote,
    Template,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub email: GeneratedEmail,
    pub source: EmailSource,
    /// Distinct candidate words (4+ chars) that made it into the body.
    pub personalization_hits: usize,
}

/// Runs remote generation when allowed, falling back to templates on any failure.
pub async fn generate_email(
    completer: Option<&dyn EmailCompleter>,
    catalog: &TemplateCatalog,
    picker: &dyn TemplatePicker,
    request: &GenerationRequest,
    use_ai: bool,
) -> GenerationOutcome {
    info!(
        "Generating email: tone={}, job_len={}, candidate_len={}, use_ai={}",
        request.tone.as_str(),
        request.job_description.len(),
        request.user_description.len(),
        use_ai
    );

    if let (true, Some(completer)) = (use_ai, completer) {
        let prompt = build_generation_prompt(request);
        match completer.complete(&prompt, request.tone).await {
            Ok(completed) => {
                info!("Remote generation succeeded");
                let email = GeneratedEmail::new(completed.subject, completed.body);
                return outcome(email, EmailSource::Remote, request);
            }
            Err(e) => {
                warn!("Remote generation failed, falling back to templates: {e}");
            }
        }
    } else {
        info!("Remote generation disabled, using templates");
    }

    let email = generate_from_template(catalog, picker, request);
    outcome(email, EmailSource::Template, request)
}

/// The fallback engine: classification, extraction, template pick, substitution.
pub fn generate_from_template(
    catalog: &TemplateCatalog,
    picker: &dyn TemplatePicker,
    request: &GenerationRequest,
) -> GeneratedEmail {
    let classification = classify(&request.job_description, &request.user_description);
    let profile = extract_profile(&request.user_description);

    debug!(
        "Template generation: role={:?}, field={:?}, skills={}, achievements={}, certifications={}, experience={}",
        classification.role_category,
        classification.specialization_field,
        profile.skills.len(),
        profile.achievements.len(),
        profile.certifications.len(),
        profile.experience_summary.is_some()
    );

    let template = catalog.pick(request.tone, picker);
    personalize(template, &classification, &profile)
}

/// Counts distinct candidate words longer than three characters that appear
/// (case-insensitively) in `body`. Surrounding punctuation is ignored.
pub fn personalization_hits(candidate_text: &str, body: &str) -> usize {
    let body = body.to_lowercase();
    candidate_text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| w.chars().count() >= MIN_MATCHED_WORD_CHARS)
        .collect::<HashSet<_>>()
        .into_iter()
        .filter(|w| body.contains(w.as_str()))
        .count()
}

fn outcome(
    email: GeneratedEmail,
    source: EmailSource,
    request: &GenerationRequest,
) -> GenerationOutcome {
    let personalization_hits = personalization_hits(&request.user_description, &email.body);
    if personalization_hits == 0 {
        warn!("Generated email does not reference the candidate's own words");
    }
    GenerationOutcome {
        email,
        source,
        personalization_hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::email::completion::CompletedEmail;
    use crate::email::models::Tone;
    use crate::email::personalizer::find_placeholders;
    use crate::email::templates::{FixedPicker, RandomPicker};
    use crate::llm_client::LlmError;

    const SAMPLE_JOB: &str = "Software Engineer - Full Stack Developer\n\
        We are looking for a passionate Full Stack Developer to join our team.\n\
        Requirements:\n- 3+ years experience with React and Node.js\n\
        - Knowledge of cloud platforms (AWS preferred)";

    const SAMPLE_CANDIDATE: &str = "I have 4 years of experience as a Full Stack Developer with \
        expertise in React, Node.js, and Python. I built an e-commerce platform that increased \
        sales by 30% and reduced page load times by 50%. I'm AWS certified and have experience \
        with MongoDB and PostgreSQL.";

    struct FixedCompleter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmailCompleter for FixedCompleter {
        async fn complete(&self, prompt: &str, _tone: Tone) -> Result<CompletedEmail, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(prompt.contains("Full Stack Developer"));
            Ok(CompletedEmail {
                subject: "Remote subject".to_string(),
                body: "Remote body mentioning React and Python".to_string(),
            })
        }
    }

    struct FailingCompleter;

    #[async_trait]
    impl EmailCompleter for FailingCompleter {
        async fn complete(&self, _prompt: &str, _tone: Tone) -> Result<CompletedEmail, LlmError> {
            Err(LlmError::Api {
                status: 401,
                message: "Incorrect API key provided".to_string(),
            })
        }
    }

    fn request(job: &str, candidate: &str, tone: Tone) -> GenerationRequest {
        GenerationRequest {
            job_description: job.to_string(),
            user_description: candidate.to_string(),
            tone,
        }
    }

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::embedded().unwrap()
    }

    #[tokio::test]
    async fn test_remote_result_is_used_when_available() {
        let completer = FixedCompleter {
            calls: AtomicUsize::new(0),
        };
        let req = request(SAMPLE_JOB, SAMPLE_CANDIDATE, Tone::Formal);
        let outcome =
            generate_email(Some(&completer), &catalog(), &RandomPicker, &req, true).await;
        assert_eq!(outcome.source, EmailSource::Remote);
        assert_eq!(outcome.email.subject, "Remote subject");
        assert_eq!(completer.calls.load(Ordering::SeqCst), 1);
        assert!(outcome.personalization_hits >= 2);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_template() {
        let req = request(SAMPLE_JOB, SAMPLE_CANDIDATE, Tone::Persuasive);
        let outcome =
            generate_email(Some(&FailingCompleter), &catalog(), &FixedPicker(0), &req, true).await;
        assert_eq!(outcome.source, EmailSource::Template);
        assert!(outcome.email.subject.contains("Software Developer Position"));
        assert_eq!(find_placeholders(&outcome.email.body).count(), 0);
    }

    #[tokio::test]
    async fn test_use_ai_false_skips_completer() {
        let completer = FixedCompleter {
            calls: AtomicUsize::new(0),
        };
        let req = request(SAMPLE_JOB, SAMPLE_CANDIDATE, Tone::Friendly);
        let outcome =
            generate_email(Some(&completer), &catalog(), &RandomPicker, &req, false).await;
        assert_eq!(outcome.source, EmailSource::Template);
        assert_eq!(completer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_completer_uses_template() {
        let req = request(SAMPLE_JOB, SAMPLE_CANDIDATE, Tone::Academic);
        let outcome = generate_email(None, &catalog(), &RandomPicker, &req, true).await;
        assert_eq!(outcome.source, EmailSource::Template);
    }

    #[test]
    fn test_template_generation_personalizes_sample() {
        let catalog = catalog();
        let req = request(SAMPLE_JOB, SAMPLE_CANDIDATE, Tone::Formal);
        // second formal template: years, skill list, achievements, field
        let email = generate_from_template(&catalog, &FixedPicker(1), &req);
        assert_eq!(
            email.subject,
            "Enthusiastic Application for the Software Developer Position"
        );
        assert!(email.body.contains("→ 4 years of experience in frontend development"));
        assert!(email
            .body
            .contains("→ Expertise in React, Python, Node.js, SQL, MongoDB"));
        assert!(email
            .body
            .contains("→ Proven results: increased sales by 30% and reduced page load times by 50%"));
    }

    #[test]
    fn test_empty_inputs_still_produce_complete_email() {
        let catalog = catalog();
        for tone in Tone::ALL {
            for index in 0..catalog.templates_for(tone).len() {
                let req = request("", "", tone);
                let email = generate_from_template(&catalog, &FixedPicker(index), &req);
                assert!(!email.subject.is_empty());
                assert!(!email.body.is_empty());
                assert_eq!(find_placeholders(&email.subject).count(), 0);
                assert_eq!(find_placeholders(&email.body).count(), 0);
            }
        }
    }

    #[test]
    fn test_empty_inputs_use_literal_fallbacks() {
        let catalog = catalog();
        let req = request("", "", Tone::Formal);
        let email = generate_from_template(&catalog, &FixedPicker(1), &req);
        assert_eq!(email.subject, "Enthusiastic Application for the Open Position");
        assert!(email.body.contains("→ Several years in technology"));
        assert!(email.body.contains("→ Expertise in a broad set of modern technical tools"));
        assert!(email.body.contains("→ Proven results: successful project delivery"));
    }

    #[test]
    fn test_academic_tone_selects_academic_template() {
        let catalog = catalog();
        let academic: Vec<_> = catalog
            .templates_for(Tone::Academic)
            .iter()
            .map(|t| t.subject.split('[').next().unwrap_or_default().to_string())
            .collect();
        let req = request("Merit scholarship", "Machine learning research", Tone::Academic);
        for _ in 0..25 {
            let email = generate_from_template(&catalog, &RandomPicker, &req);
            assert!(
                academic.iter().any(|prefix| email.subject.starts_with(prefix.as_str())),
                "{} is not an academic subject",
                email.subject
            );
            assert!(email.subject.contains("Academic Scholarship Program"));
        }
    }

    #[test]
    fn test_personalization_hits_counts_distinct_long_words() {
        let hits = personalization_hits("React, react Go rust Python.", "I use React and Python");
        // "react" once, "python" once; "go" too short; "rust" absent
        assert_eq!(hits, 2);
        assert_eq!(personalization_hits("", "anything"), 0);
    }
}
