//! Role / specialization classification via ordered keyword rules.
//!
//! First matching rule wins. Rule ORDER IS SEMANTIC: "software marketing"
//! is `Software`, "marketing scholarship" is `Marketing`.

use crate::email::models::{Classification, RoleCategory, SpecializationField};

/// A rule fires when every group has at least one keyword present in the text.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<C> {
    pub all_of: &'static [&'static [&'static str]],
    pub category: C,
}

/// Role rules, evaluated against the job text.
pub const ROLE_RULES: &[KeywordRule<RoleCategory>] = &[
    KeywordRule {
        all_of: &[&["software", "developer", "engineer"]],
        category: RoleCategory::Software,
    },
    KeywordRule {
        all_of: &[&["marketing"]],
        category: RoleCategory::Marketing,
    },
    KeywordRule {
        all_of: &[&["data"], &["scientist", "analyst"]],
        category: RoleCategory::DataScience,
    },
    KeywordRule {
        all_of: &[&["scholarship", "academic"]],
        category: RoleCategory::Academic,
    },
];

/// Specialization rules, evaluated against the candidate text.
pub const SPECIALIZATION_RULES: &[KeywordRule<SpecializationField>] = &[
    KeywordRule {
        all_of: &[&["react", "javascript", "frontend"]],
        category: SpecializationField::Frontend,
    },
    KeywordRule {
        all_of: &[&["python", "machine learning", "ai"]],
        category: SpecializationField::DataScienceAi,
    },
    KeywordRule {
        all_of: &[&["backend", "server", "database"]],
        category: SpecializationField::Backend,
    },
    KeywordRule {
        all_of: &[&["design", "ui", "ux"]],
        category: SpecializationField::DesignUx,
    },
];

pub fn classify(job_text: &str, candidate_text: &str) -> Classification {
    Classification {
        role_category: classify_role(job_text),
        specialization_field: classify_specialization(candidate_text),
    }
}

pub fn classify_role(job_text: &str) -> RoleCategory {
    first_match(job_text, ROLE_RULES).unwrap_or_default()
}

pub fn classify_specialization(candidate_text: &str) -> SpecializationField {
    first_match(candidate_text, SPECIALIZATION_RULES).unwrap_or_default()
}

/// Case-insensitive substring evaluation of `rules` in order.
pub fn first_match<C: Copy>(text: &str, rules: &[KeywordRule<C>]) -> Option<C> {
    let lower = text.to_lowercase();
    rules
        .iter()
        .find(|rule| {
            rule.all_of
                .iter()
                .all(|group| group.iter().any(|kw| lower.contains(kw)))
        })
        .map(|rule| rule.category)
}
