// Prompt constants for remote email generation.
// Reuses cross-cutting fragments from llm_client::prompts.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::email::models::{GenerationRequest, Tone};
use crate::llm_client::prompts::{EMAIL_JSON_FORMAT, SPECIFICITY_INSTRUCTION};

/// System prompt for email generation. The tone instruction is appended per call.
pub const EMAIL_WRITER_SYSTEM: &str = "You are an expert professional email writer \
    specializing in job and scholarship applications. You excel at matching candidate \
    qualifications to specific opportunities and creating compelling, personalized emails \
    that stand out to hiring managers and selection committees.";

/// Generation prompt template.
/// Replace: {job_description}, {user_description}, {specificity_instruction}, {format_instruction}
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"Generate a highly personalized professional email for a job/scholarship application.

JOB/SCHOLARSHIP DESCRIPTION:
"{job_description}"

CANDIDATE'S BACKGROUND, SKILLS & EXPERIENCE:
"{user_description}"

CRITICAL INSTRUCTIONS:
- You MUST use specific details from BOTH the job description AND the candidate's background
- Create both a compelling subject line and email body
- Match the candidate's exact skills and experience to the specific job requirements
- Highlight relevant technical skills, programming languages, projects, and achievements mentioned in the candidate's description
- Make direct connections between what the candidate has done and what the job requires
- Include concrete examples and numbers from the candidate's experience when mentioned
- Keep it concise but compelling (3-4 paragraphs max)
- Include placeholders like [Your Name], [Your Contact Information] for personalization
- Use professional language appropriate for the requested tone
- {specificity_instruction}

{format_instruction}"#;

pub fn tone_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Formal => "Write a formal, professional business email that follows traditional corporate communication standards.",
        Tone::Friendly => "Write a warm, approachable email that maintains professionalism while being personable and engaging.",
        Tone::Persuasive => "Write a compelling, results-focused email that confidently highlights value and encourages action.",
        Tone::Academic => "Write a scholarly, research-oriented email that follows academic communication conventions.",
    }
}

/// System prompt for one call: writer persona plus the tone to write in.
pub fn build_system_prompt(tone: Tone) -> String {
    format!("{EMAIL_WRITER_SYSTEM}\n\nTONE: {}", tone_instruction(tone))
}

fn user_text_slot() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{(job_description|user_description)\}")
            .expect("user text slot pattern is valid")
    })
}

/// Fixed fragments first, then both user texts in a single sweep so neither
/// text is scanned for slots.
pub fn build_generation_prompt(request: &GenerationRequest) -> String {
    let template = GENERATION_PROMPT_TEMPLATE
        .replace("{specificity_instruction}", SPECIFICITY_INSTRUCTION)
        .replace("{format_instruction}", EMAIL_JSON_FORMAT);

    user_text_slot()
        .replace_all(&template, |caps: &Captures| match &caps[1] {
            "job_description" => request.job_description.clone(),
            _ => request.user_description.clone(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_both_texts() {
        let request = GenerationRequest {
            job_description: "Rust engineer at a fintech".to_string(),
            user_description: "5 years of Rust".to_string(),
            tone: Tone::Formal,
        };
        let prompt = build_generation_prompt(&request);
        assert!(prompt.contains("\"Rust engineer at a fintech\""));
        assert!(prompt.contains("\"5 years of Rust\""));
        assert!(prompt.contains(EMAIL_JSON_FORMAT));
        assert!(!prompt.contains("{job_description}"));
        assert!(!prompt.contains("{specificity_instruction}"));
    }

    #[test]
    fn test_user_text_with_braces_is_not_reinterpreted() {
        // fixed fragments are filled first, so a literal "{format_instruction}" survives
        let request = GenerationRequest {
            job_description: "job".to_string(),
            user_description: "I wrote {format_instruction} once".to_string(),
            tone: Tone::Friendly,
        };
        let prompt = build_generation_prompt(&request);
        assert!(prompt.contains("I wrote {format_instruction} once"));
    }

    #[test]
    fn test_job_text_cannot_pull_in_candidate_text() {
        let request = GenerationRequest {
            job_description: "Paste {user_description} here".to_string(),
            user_description: "SECRET BACKGROUND".to_string(),
            tone: Tone::Formal,
        };
        let prompt = build_generation_prompt(&request);
        assert!(prompt.contains("\"Paste {user_description} here\""));
        assert_eq!(prompt.matches("SECRET BACKGROUND").count(), 1);
    }

    #[test]
    fn test_system_prompt_carries_tone() {
        for tone in Tone::ALL {
            let system = build_system_prompt(tone);
            assert!(system.starts_with(EMAIL_WRITER_SYSTEM));
            assert!(system.ends_with(tone_instruction(tone)));
        }
    }

    #[test]
    fn test_tone_instructions_are_distinct() {
        let academic = tone_instruction(Tone::Academic);
        assert!(academic.contains("scholarly"));
        assert_ne!(tone_instruction(Tone::Formal), tone_instruction(Tone::Friendly));
    }
}
