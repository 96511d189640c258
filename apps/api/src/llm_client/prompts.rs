// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to any prompt that expects an email object back.
pub const EMAIL_JSON_FORMAT: &str =
    "Format your response as JSON with \"subject\" and \"body\" fields.";

/// Instruction against filler text.
pub const SPECIFICITY_INSTRUCTION: &str = "\
    DO NOT use generic phrases. Be specific to this candidate and this opportunity. \
    Reference the exact technologies, tools, frameworks and numbers the candidate mentioned.";
