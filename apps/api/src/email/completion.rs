//! Remote completion collaborator. The generator only sees the trait, never
//! which backend (or test double) produced an email.
//!
//! Default: `LlmEmailCompleter` over the shared `LlmClient`.
//! `AppState` holds an `Option<Arc<dyn EmailCompleter>>`; `None` means every
//! request goes straight to the template engine.

use async_trait::async_trait;
use serde::Deserialize;

use crate::email::models::Tone;
use crate::email::prompts::build_system_prompt;
use crate::llm_client::{strip_json_fences, LlmClient, LlmError};

/// Subject used when the model does not provide one.
pub const DEFAULT_SUBJECT: &str = "Professional Application";

/// A subject/body pair as returned by the remote model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedEmail {
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait EmailCompleter: Send + Sync {
    async fn complete(&self, prompt: &str, tone: Tone) -> Result<CompletedEmail, LlmError>;
}

pub struct LlmEmailCompleter(pub LlmClient);

#[async_trait]
impl EmailCompleter for LlmEmailCompleter {
    async fn complete(&self, prompt: &str, tone: Tone) -> Result<CompletedEmail, LlmError> {
        let system = build_system_prompt(tone);
        let text = self.0.call_text(prompt, &system).await?;
        parse_completion(&text)
    }
}

#[derive(Debug, Deserialize)]
struct RawEmail {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// Interprets model output as an email.
///
/// JSON `{subject, body}` first (code fences tolerated). Otherwise the first
/// line containing `subject:` supplies the subject and the rest is the body.
pub fn parse_completion(content: &str) -> Result<CompletedEmail, LlmError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(LlmError::EmptyContent);
    }

    if let Ok(raw) = serde_json::from_str::<RawEmail>(strip_json_fences(content)) {
        let subject = non_empty(raw.subject).unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
        let body = non_empty(raw.body).unwrap_or_else(|| content.to_string());
        return Ok(CompletedEmail { subject, body });
    }

    let subject_line = content
        .lines()
        .find(|line| line.to_ascii_lowercase().contains("subject:"));

    let Some(line) = subject_line else {
        return Ok(CompletedEmail {
            subject: DEFAULT_SUBJECT.to_string(),
            body: content.to_string(),
        });
    };

    // ASCII lowercasing keeps byte offsets aligned with `line`
    let offset = line.to_ascii_lowercase().find("subject:").unwrap_or(0) + "subject:".len();
    let subject = line[offset..].trim();
    let body = content.replacen(line, "", 1).trim().to_string();

    Ok(CompletedEmail {
        subject: if subject.is_empty() {
            DEFAULT_SUBJECT.to_string()
        } else {
            subject.to_string()
        },
        body,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_email() {
        let email =
            parse_completion(r#"{"subject": "Rust role", "body": "Dear team,\nHello"}"#).unwrap();
        assert_eq!(email.subject, "Rust role");
        assert_eq!(email.body, "Dear team,\nHello");
    }

    #[test]
    fn test_parse_fenced_json_email() {
        let email =
            parse_completion("```json\n{\"subject\": \"Hi\", \"body\": \"There\"}\n```").unwrap();
        assert_eq!(email.subject, "Hi");
        assert_eq!(email.body, "There");
    }

    #[test]
    fn test_json_missing_subject_gets_default() {
        let email = parse_completion(r#"{"body": "Only a body"}"#).unwrap();
        assert_eq!(email.subject, DEFAULT_SUBJECT);
        assert_eq!(email.body, "Only a body");
    }

    #[test]
    fn test_json_missing_body_uses_raw_content() {
        let raw = r#"{"subject": "Just a subject"}"#;
        let email = parse_completion(raw).unwrap();
        assert_eq!(email.subject, "Just a subject");
        assert_eq!(email.body, raw);
    }

    #[test]
    fn test_plain_text_with_subject_line() {
        let raw = "Subject: Application for Data Scientist\n\nDear Hiring Manager,\nI am keen.";
        let email = parse_completion(raw).unwrap();
        assert_eq!(email.subject, "Application for Data Scientist");
        assert_eq!(email.body, "Dear Hiring Manager,\nI am keen.");
    }

    #[test]
    fn test_plain_text_subject_case_insensitive() {
        let email = parse_completion("SUBJECT:   Hello there\nBody text").unwrap();
        assert_eq!(email.subject, "Hello there");
        assert_eq!(email.body, "Body text");
    }

    #[test]
    fn test_plain_text_without_subject() {
        let email = parse_completion("Dear team,\nI would like to apply.").unwrap();
        assert_eq!(email.subject, DEFAULT_SUBJECT);
        assert_eq!(email.body, "Dear team,\nI would like to apply.");
    }

    #[test]
    fn test_empty_content_is_error() {
        assert!(matches!(parse_completion("   "), Err(LlmError::EmptyContent)));
    }
}
