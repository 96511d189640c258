//! Request-scoped value types shared by the extraction, classification and
//! personalization stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Communication style requested by the caller. Drives template selection
/// and the tone instruction sent to the remote model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Formal,
    Friendly,
    Persuasive,
    Academic,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Formal, Tone::Friendly, Tone::Persuasive, Tone::Academic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Friendly => "friendly",
            Tone::Persuasive => "persuasive",
            Tone::Academic => "academic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tone::Formal => "Formal",
            Tone::Friendly => "Friendly",
            Tone::Persuasive => "Persuasive",
            Tone::Academic => "Academic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tone::Formal => "Professional and traditional business tone",
            Tone::Friendly => "Warm and approachable communication style",
            Tone::Persuasive => "Compelling and results-focused language",
            Tone::Academic => "Scholarly and research-oriented approach",
        }
    }
}

/// Input to a single generation. Non-empty texts are enforced by the
/// handler, never by the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub job_description: String,
    pub user_description: String,
    #[serde(default)]
    pub tone: Tone,
}

/// Signals pulled out of the candidate's free text.
///
/// `skills` and `certifications` follow keyword-catalog order, `achievements`
/// follow discovery order across the verb patterns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProfile {
    pub skills: Vec<String>,
    pub experience_summary: Option<String>,
    pub achievements: Vec<String>,
    pub certifications: Vec<String>,
}

/// Coarse domain of the target opportunity, inferred from the job text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    Software,
    Marketing,
    DataScience,
    Academic,
    #[default]
    Generic,
}

/// Coarse domain strength of the candidate, inferred from the candidate text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecializationField {
    Frontend,
    DataScienceAi,
    Backend,
    DesignUx,
    #[default]
    Technology,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub role_category: RoleCategory,
    pub specialization_field: SpecializationField,
}

/// Final email handed back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedEmail {
    pub subject: String,
    pub body: String,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedEmail {
    pub fn new(subject: String, body: String) -> Self {
        Self {
            subject,
            body,
            generated_at: Utc::now(),
        }
    }

    /// Copy / download format: subject header, blank line, body.
    pub fn to_plain_text(&self) -> String {
        format!("Subject: {}\n\n{}", self.subject, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_serde_snake_case() {
        let tone: Tone = serde_json::from_str(r#""persuasive""#).unwrap();
        assert_eq!(tone, Tone::Persuasive);
        assert_eq!(serde_json::to_string(&Tone::Academic).unwrap(), r#""academic""#);
    }

    #[test]
    fn test_tone_default_is_formal() {
        assert_eq!(Tone::default(), Tone::Formal);
    }

    #[test]
    fn test_unknown_tone_rejected() {
        let result: Result<Tone, _> = serde_json::from_str(r#""sarcastic""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_tone_defaults_when_missing() {
        let json = r#"{"job_description": "Engineer", "user_description": "Rust"}"#;
        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.tone, Tone::Formal);
    }

    #[test]
    fn test_every_tone_has_label_and_description() {
        for tone in Tone::ALL {
            assert!(!tone.label().is_empty());
            assert!(!tone.description().is_empty());
            assert_eq!(tone.as_str(), tone.label().to_lowercase());
        }
    }

    #[test]
    fn test_plain_text_export() {
        let email = GeneratedEmail::new("Hello".to_string(), "Dear team,\nHi.".to_string());
        assert_eq!(email.to_plain_text(), "Subject: Hello\n\nDear team,\nHi.");
    }

    #[test]
    fn test_classification_serializes_snake_case() {
        let c = Classification {
            role_category: RoleCategory::DataScience,
            specialization_field: SpecializationField::DataScienceAi,
        };
        let json = serde_json::to_value(c).unwrap();
        assert_eq!(json["role_category"], "data_science");
        assert_eq!(json["specialization_field"], "data_science_ai");
    }
}
