//! Signal extraction: pulls skills, experience, achievements and certifications
//! out of the candidate's free text.
//!
//! Every table here is ordered data. Matching logic is generic over the tables,
//! so adding a keyword or a verb never touches control flow.
//!
//! Matching is plain case-insensitive substring search (skills, certifications)
//! or a small regex (experience, achievement verbs). There is no tokenization,
//! so short keywords like `go` or `ai` also fire inside longer words.

use std::sync::OnceLock;

use regex::Regex;

use crate::email::models::ExtractedProfile;

/// Achievements at or above this many characters are discarded.
pub const MAX_ACHIEVEMENT_CHARS: usize = 100;

/// A keyword searched for in lowercased text, and the form it is reported in.
#[derive(Debug, Clone, Copy)]
pub struct Keyword {
    pub needle: &'static str,
    pub display: &'static str,
}

const fn kw(needle: &'static str, display: &'static str) -> Keyword {
    Keyword { needle, display }
}

/// Technology / tool / practice keywords, in reporting order.
pub const TECH_KEYWORDS: &[Keyword] = &[
    kw("react", "React"),
    kw("javascript", "JavaScript"),
    kw("typescript", "TypeScript"),
    kw("python", "Python"),
    kw("node.js", "Node.js"),
    kw("java", "Java"),
    kw("c++", "C++"),
    kw("sql", "SQL"),
    kw("mongodb", "MongoDB"),
    kw("aws", "AWS"),
    kw("docker", "Docker"),
    kw("kubernetes", "Kubernetes"),
    kw("git", "Git"),
    kw("html", "HTML"),
    kw("css", "CSS"),
    kw("vue", "Vue"),
    kw("angular", "Angular"),
    kw("express", "Express"),
    kw("django", "Django"),
    kw("flask", "Flask"),
    kw("spring", "Spring"),
    kw("laravel", "Laravel"),
    kw("php", "PHP"),
    kw("ruby", "Ruby"),
    kw("go", "Go"),
    kw("rust", "Rust"),
    kw("swift", "Swift"),
    kw("kotlin", "Kotlin"),
    kw("tensorflow", "TensorFlow"),
    kw("pytorch", "PyTorch"),
    kw("machine learning", "Machine Learning"),
    kw("ai", "AI"),
    kw("data science", "Data Science"),
    kw("blockchain", "Blockchain"),
    kw("devops", "DevOps"),
    kw("api", "API"),
    kw("rest", "REST"),
    kw("graphql", "GraphQL"),
];

/// Certification and vendor keywords, in reporting order.
pub const CERTIFICATION_KEYWORDS: &[Keyword] = &[
    kw("certified", "Certified"),
    kw("certification", "Certification"),
    kw("aws", "AWS"),
    kw("google cloud", "Google Cloud"),
    kw("azure", "Azure"),
    kw("comptia", "CompTIA"),
    kw("cisco", "Cisco"),
    kw("oracle", "Oracle"),
    kw("microsoft", "Microsoft"),
    kw("pmp", "PMP"),
    kw("scrum master", "Scrum Master"),
    kw("agile", "Agile"),
];

/// An action verb that opens an achievement clause.
#[derive(Debug, Clone, Copy)]
pub struct AchievementVerb {
    /// Regex fragment matched at a word boundary, case-insensitively.
    pub verb: &'static str,
    /// Clause only counts when it carries a percentage.
    pub needs_metric: bool,
}

const fn metric(verb: &'static str) -> AchievementVerb {
    AchievementVerb {
        verb,
        needs_metric: true,
    }
}

const fn clause(verb: &'static str) -> AchievementVerb {
    AchievementVerb {
        verb,
        needs_metric: false,
    }
}

/// Verb patterns, evaluated in this order.
pub const ACHIEVEMENT_VERBS: &[AchievementVerb] = &[
    metric("increased"),
    metric("improved"),
    metric("reduced"),
    metric("boosted"),
    clause("built"),
    clause("created"),
    clause("developed"),
    clause("designed"),
    clause("implemented"),
    clause("launched"),
    clause("managed"),
    clause("led"),
    clause("delivered"),
    clause("completed"),
    clause("achieved"),
    clause("optimi[sz]ed"),
    clause("automated"),
    clause("scaled"),
];

fn experience_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\+?\s*years?\s*(?:of\s*)?(?:experience|exp)")
            .expect("experience pattern is valid")
    })
}

fn metric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?\s?%").expect("metric pattern is valid"))
}

fn achievement_patterns() -> &'static [(Regex, bool)] {
    static PATTERNS: OnceLock<Vec<(Regex, bool)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        ACHIEVEMENT_VERBS
            .iter()
            .map(|v| {
                // horizontal whitespace only: a verb never owns the next line
                let re = Regex::new(&format!(r"(?i)\b{}[ \t]+", v.verb))
                    .expect("achievement verb pattern is valid");
                (re, v.needs_metric)
            })
            .collect()
    })
}

/// Builds the full profile for one candidate description.
pub fn extract_profile(candidate_text: &str) -> ExtractedProfile {
    ExtractedProfile {
        skills: extract_skills(candidate_text),
        experience_summary: extract_experience(candidate_text),
        achievements: extract_achievements(candidate_text),
        certifications: extract_certifications(candidate_text),
    }
}

/// Skills in catalog order, deduplicated by display form.
pub fn extract_skills(text: &str) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();
    for display in match_keywords(text, TECH_KEYWORDS) {
        if !skills.iter().any(|s| s == display) {
            skills.push(display.to_string());
        }
    }
    skills
}

pub fn extract_certifications(text: &str) -> Vec<String> {
    match_keywords(text, CERTIFICATION_KEYWORDS)
        .map(str::to_string)
        .collect()
}

fn match_keywords<'a>(
    text: &str,
    table: &'a [Keyword],
) -> impl Iterator<Item = &'a str> + 'a {
    let lower = text.to_lowercase();
    table
        .iter()
        .filter(move |k| lower.contains(k.needle))
        .map(|k| k.display)
}

/// `"<N> years of experience"` from the first experience phrase, if any.
pub fn extract_experience(text: &str) -> Option<String> {
    let caps = experience_pattern().captures(text)?;
    let years = caps.get(1)?.as_str();
    let unit = if years == "1" { "year" } else { "years" };
    Some(format!("{years} {unit} of experience"))
}

/// Achievement clauses in discovery order: verb patterns in table order,
/// left-to-right within a pattern.
///
/// A clause starts at the verb and stops before the first newline, or before
/// a `.`, `!` or `?` that is followed by whitespace or the end of the text.
/// The verb must be followed on the same line by at least one word. Clauses
/// keep the casing of the source text. After an accepted clause the same
/// pattern resumes past its end.
pub fn extract_achievements(text: &str) -> Vec<String> {
    let mut achievements = Vec::new();

    for (pattern, needs_metric) in achievement_patterns() {
        let mut pos = 0;
        while let Some(m) = pattern.find_at(text, pos) {
            let end = clause_end(text, m.end());
            let raw = text[m.start()..end].trim_end_matches(is_clause_padding);
            let has_object = !text[m.end()..end]
                .trim_matches(is_clause_padding)
                .is_empty();

            let accepted = has_object
                && raw.chars().count() < MAX_ACHIEVEMENT_CHARS
                && (!needs_metric || metric_pattern().is_match(raw));

            if accepted {
                achievements.push(raw.to_string());
                pos = end;
            } else {
                pos = m.end();
            }
        }
    }

    achievements
}

fn clause_end(text: &str, from: usize) -> usize {
    let mut chars = text[from..].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '\n' | '\r' => return from + i,
            '.' | '!' | '?' => match chars.peek() {
                None => return from + i,
                Some((_, next)) if next.is_whitespace() => return from + i,
                _ => {}
            },
            _ => {}
        }
    }
    text.len()
}

fn is_clause_padding(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == ';'
}
