//! Personalizer: fills a template's `[placeholder]` tokens from the
//! classification and the extracted profile.
//!
//! Rules live in one ordered table, grouped by pass (position, field,
//! experience, skill list, single skill, achievement, compound). Each rule
//! replaces every occurrence of its placeholder in one sweep. Substituted
//! values never contain `[` or `]`, so no pass can re-match text introduced
//! by an earlier one, and running the whole table twice is a no-op.
//!
//! Every rule has its own fallback text for an empty signal, so a signal-free
//! candidate never produces the same boilerplate twice in one email.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::email::models::{
    Classification, ExtractedProfile, GeneratedEmail, RoleCategory, SpecializationField,
};
use crate::email::templates::Template;

/// Skill-list placeholders show at most this many skills.
pub const MAX_LISTED_SKILLS: usize = 5;

/// Used for any placeholder without a rule. Validated catalogs never reach it.
pub const CATCH_ALL_FALLBACK: &str = "relevant experience";

/// Where a placeholder sits. Only the position phrase differs between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Subject,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Pass {
    Position,
    Field,
    Experience,
    SkillList,
    SingleSkill,
    Achievement,
    Compound,
}

/// Position wording for a role category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePhrase {
    pub subject: &'static str,
    pub body: &'static str,
}

pub fn role_phrase(category: RoleCategory) -> RolePhrase {
    match category {
        RoleCategory::Software => RolePhrase {
            subject: "Software Developer Position",
            body: "Software Developer position",
        },
        RoleCategory::Marketing => RolePhrase {
            subject: "Marketing Specialist Position",
            body: "Marketing Specialist position",
        },
        RoleCategory::DataScience => RolePhrase {
            subject: "Data Scientist Position",
            body: "Data Scientist position",
        },
        RoleCategory::Academic => RolePhrase {
            subject: "Academic Scholarship Program",
            body: "academic scholarship",
        },
        RoleCategory::Generic => RolePhrase {
            subject: "Open Position",
            body: "open position",
        },
    }
}

pub fn field_phrase(field: SpecializationField) -> &'static str {
    match field {
        SpecializationField::Frontend => "frontend development",
        SpecializationField::DataScienceAi => "data science and AI",
        SpecializationField::Backend => "backend development",
        SpecializationField::DesignUx => "design and user experience",
        SpecializationField::Technology => "technology",
    }
}

/// Read-only view over one request's signals.
#[derive(Debug, Clone, Copy)]
pub struct SubstitutionContext<'a> {
    pub classification: &'a Classification,
    pub profile: &'a ExtractedProfile,
}

impl<'a> SubstitutionContext<'a> {
    pub fn new(classification: &'a Classification, profile: &'a ExtractedProfile) -> Self {
        Self {
            classification,
            profile,
        }
    }

    fn skill(&self, index: usize) -> Option<&'a str> {
        self.profile.skills.get(index).map(String::as_str)
    }

    fn achievement(&self) -> Option<&'a str> {
        self.profile.achievements.first().map(String::as_str)
    }

    fn experience(&self) -> Option<&'a str> {
        self.profile.experience_summary.as_deref()
    }

    fn field(&self) -> &'static str {
        field_phrase(self.classification.specialization_field)
    }

    fn role(&self) -> RolePhrase {
        role_phrase(self.classification.role_category)
    }
}

type Render = fn(&SubstitutionContext<'_>, Slot) -> String;

/// One named placeholder and how to fill it.
#[derive(Clone, Copy)]
pub struct PlaceholderRule {
    /// Lowercase placeholder name, matched case-insensitively.
    pub name: &'static str,
    pub pass: Pass,
    pub render: Render,
}

const fn rule(name: &'static str, pass: Pass, render: Render) -> PlaceholderRule {
    PlaceholderRule { name, pass, render }
}

/// Substitution rules, applied in this order.
pub const PLACEHOLDER_RULES: &[PlaceholderRule] = &[
    // position
    rule("position", Pass::Position, position),
    rule("position/program", Pass::Position, position),
    // field
    rule("relevant field", Pass::Field, field),
    rule("relevant area", Pass::Field, field),
    rule("field/industry", Pass::Field, field),
    rule("area of specialization", Pass::Field, field),
    rule("research area", Pass::Field, field),
    // experience
    rule("years", Pass::Experience, years),
    // skill list
    rule("specific skills/tools", Pass::SkillList, skill_list),
    // single skill
    rule("key skill or experience", Pass::SingleSkill, key_skill),
    rule("relevant skill", Pass::SingleSkill, relevant_skill),
    rule("technical or soft skill", Pass::SingleSkill, technical_or_soft_skill),
    rule("job requirement", Pass::SingleSkill, job_requirement),
    // achievements
    rule("relevant achievement", Pass::Achievement, relevant_achievement),
    rule("achievement or certification", Pass::Achievement, achievement_or_certification),
    rule("specific achievements", Pass::Achievement, specific_achievements),
    rule("quantifiable achievement", Pass::Achievement, quantifiable_achievement),
    rule("specific achievement with numbers", Pass::Achievement, achievement_with_numbers),
    rule("key findings or contributions", Pass::Achievement, key_findings),
    // compound
    rule("relevant experience or skill", Pass::Compound, experience_in_field),
    rule("unique combination of skills/experience", Pass::Compound, skill_combination),
    rule("personal quality or strength", Pass::Compound, personal_strength),
    rule("what sets you apart", Pass::Compound, sets_apart),
    rule("relevant skill/achievement", Pass::Compound, skill_or_achievement),
    rule("specific aspect that interests you", Pass::Compound, aspect_that_interests),
    rule("interesting company aspect", Pass::Compound, company_aspect),
    rule("appealing job responsibility", Pass::Compound, job_responsibility_appeal),
    rule("growth opportunity", Pass::Compound, growth_opportunity),
    rule("reason related to company/role", Pass::Compound, reason_for_role),
    rule("specific aspect of the role", Pass::Compound, aspect_of_role),
    rule("specific job responsibility", Pass::Compound, specific_responsibility),
    rule("personal motivation", Pass::Compound, personal_motivation),
    rule("relevant expertise that solves their problem", Pass::Compound, problem_solving_expertise),
    rule("track record of success", Pass::Compound, track_record),
    rule("specific challenge mentioned in job posting", Pass::Compound, role_challenge),
];

fn position(ctx: &SubstitutionContext<'_>, slot: Slot) -> String {
    let phrase = ctx.role();
    match slot {
        Slot::Subject => phrase.subject.to_string(),
        Slot::Body => phrase.body.to_string(),
    }
}

fn field(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    ctx.field().to_string()
}

fn years(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    ctx.experience().unwrap_or("Several years").to_string()
}

fn skill_list(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    let skills = &ctx.profile.skills;
    if skills.is_empty() {
        return "a broad set of modern technical tools".to_string();
    }
    skills
        .iter()
        .take(MAX_LISTED_SKILLS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn key_skill(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    match ctx.skill(0) {
        Some(skill) => format!("Expertise in {skill}"),
        None => "Hands-on technical experience".to_string(),
    }
}

fn relevant_skill(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    ctx.skill(0).unwrap_or("technical skills").to_string()
}

fn technical_or_soft_skill(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    match ctx.skill(0) {
        Some(skill) => format!("Proficiency in {skill}"),
        None => "Clear communication and problem-solving".to_string(),
    }
}

fn job_requirement(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    format!("{} expertise", ctx.skill(0).unwrap_or("technical"))
}

// Bullet-leading renderers capitalise; the rest keep the clause as written.

fn relevant_achievement(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    match ctx.achievement() {
        Some(achievement) => capitalize_first(achievement),
        None => "Professional accomplishments".to_string(),
    }
}

fn achievement_or_certification(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    if let Some(achievement) = ctx.achievement() {
        return capitalize_first(achievement);
    }
    // "Certified" / "Certification" say nothing on their own
    let vendors: Vec<&str> = ctx
        .profile
        .certifications
        .iter()
        .map(String::as_str)
        .filter(|c| !c.starts_with("Certifi"))
        .collect();
    if vendors.is_empty() {
        "Recognized professional credentials".to_string()
    } else {
        format!("Professional certification: {}", vendors.join(", "))
    }
}

fn specific_achievements(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    ctx.achievement()
        .unwrap_or("successful project delivery")
        .to_string()
}

fn quantifiable_achievement(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    match ctx.achievement() {
        Some(achievement) => capitalize_first(achievement),
        None => "Proven, measurable results".to_string(),
    }
}

fn achievement_with_numbers(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    ctx.achievement().unwrap_or("demonstrated success").to_string()
}

fn key_findings(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    ctx.achievement()
        .unwrap_or("original contributions to ongoing research")
        .to_string()
}

fn experience_in_field(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    let experience = ctx.experience().map(capitalize_first);
    format!(
        "{} in {}",
        experience.as_deref().unwrap_or("Professional experience"),
        ctx.field()
    )
}

fn skill_combination(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    match (ctx.skill(0), ctx.skill(1)) {
        (Some(first), Some(second)) => format!("a combination of {first} and {second} expertise"),
        (Some(first), None) => format!("deep {first} expertise"),
        _ => "a rare blend of technical depth and delivery focus".to_string(),
    }
}

fn personal_strength(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    match ctx.skill(2) {
        Some(skill) => format!("Strong background in {skill}"),
        None => "Strong technical foundation".to_string(),
    }
}

fn sets_apart(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    match ctx.skill(0) {
        Some(skill) => format!("Specialized expertise in {skill}"),
        None => "Unique technical perspective".to_string(),
    }
}

fn skill_or_achievement(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    ctx.achievement()
        .or_else(|| ctx.skill(0))
        .unwrap_or("professional expertise")
        .to_string()
}

fn aspect_that_interests(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    format!(
        "the opportunity to work with {}",
        ctx.skill(0).unwrap_or("modern technologies")
    )
}

fn company_aspect(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    format!("Your team's use of {}", ctx.skill(0).unwrap_or("technology"))
}

fn job_responsibility_appeal(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    match (ctx.skill(0), ctx.skill(1)) {
        (Some(first), Some(second)) => format!("Working with {first} and {second}"),
        (Some(first), None) => format!("Working with {first}"),
        _ => "Working on technical challenges".to_string(),
    }
}

fn growth_opportunity(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    format!("Advancing my {} skills", ctx.field())
}

fn reason_for_role(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    format!(
        "it aligns with my expertise in {}",
        ctx.skill(0).unwrap_or("technology")
    )
}

fn aspect_of_role(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    format!("utilizing my {} skills", ctx.skill(0).unwrap_or("technical"))
}

fn specific_responsibility(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    format!("apply my {} expertise", ctx.skill(0).unwrap_or("technical"))
}

fn personal_motivation(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    format!("it leverages my passion for {}", ctx.field())
}

fn problem_solving_expertise(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    format!(
        "{} expertise that addresses your needs",
        ctx.skill(0).unwrap_or("Technical")
    )
}

fn track_record(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    match (ctx.achievement(), ctx.experience()) {
        (Some(achievement), _) => capitalize_first(achievement),
        (None, Some(experience)) => capitalize_first(experience),
        (None, None) => "Consistent professional growth".to_string(),
    }
}

fn role_challenge(ctx: &SubstitutionContext<'_>, _: Slot) -> String {
    format!("the core challenges of this {}", ctx.role().body)
}

pub(crate) fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[([^\[\]\n]+)\]").expect("placeholder pattern is valid"))
}

/// Names of every `[name]` token in `text`, in order of appearance.
pub fn find_placeholders(text: &str) -> impl Iterator<Item = &str> {
    placeholder_pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

pub fn has_rule(name: &str) -> bool {
    PLACEHOLDER_RULES
        .iter()
        .any(|r| r.name.eq_ignore_ascii_case(name.trim()))
}

/// Replaces every `[name]` token (case-insensitive) with `value` in one sweep.
pub fn replace_placeholder(text: &str, name: &str, value: &str) -> String {
    placeholder_pattern()
        .replace_all(text, |caps: &Captures| {
            if caps[1].trim().eq_ignore_ascii_case(name) {
                value.to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn sanitize(value: String) -> String {
    if value.contains(['[', ']']) {
        value.replace(['[', ']'], "")
    } else {
        value
    }
}

/// Runs every rule over `text`, then the catch-all. The result contains no
/// placeholder tokens.
pub fn substitute(text: &str, slot: Slot, ctx: &SubstitutionContext<'_>) -> String {
    let mut out = text.to_string();

    for rule in PLACEHOLDER_RULES {
        let present = find_placeholders(&out).any(|name| name.trim().eq_ignore_ascii_case(rule.name));
        if !present {
            continue;
        }
        let value = sanitize((rule.render)(ctx, slot));
        out = replace_placeholder(&out, rule.name, &value);
    }

    // Each sweep removes a bracket pair, so nested tokens like `[[x]]` unwind.
    loop {
        let next = find_placeholders(&out).next().map(str::to_string);
        let Some(unknown) = next else { break };
        warn!("Template placeholder '[{unknown}]' has no rule, using catch-all text");
        out = placeholder_pattern()
            .replace_all(&out, CATCH_ALL_FALLBACK)
            .into_owned();
    }

    out
}

/// Fills `template` for one request.
pub fn personalize(
    template: &Template,
    classification: &Classification,
    profile: &ExtractedProfile,
) -> GeneratedEmail {
    let ctx = SubstitutionContext::new(classification, profile);
    GeneratedEmail::new(
        substitute(&template.subject, Slot::Subject, &ctx),
        substitute(&template.body, Slot::Body, &ctx),
    )
}
