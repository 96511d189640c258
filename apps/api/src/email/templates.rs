//! Template store: the tone-keyed fallback catalog and template selection.
//!
//! The catalog is TOML data (`templates/catalog.toml`), embedded at build time
//! and optionally overridden from disk. It is parsed and validated once at
//! startup, then shared read-only across requests.

use std::collections::HashMap;
use std::path::Path;

use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::email::models::Tone;
use crate::email::personalizer::{find_placeholders, has_rule};

/// Catalog shipped with the binary.
pub const EMBEDDED_CATALOG: &str = include_str!("../../templates/catalog.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read template catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template catalog is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No template defined for tone '{0}'")]
    MissingTone(&'static str),

    #[error("Template #{index} ({tone}) uses placeholder '[{placeholder}]' which has no substitution rule")]
    UnknownPlaceholder {
        index: usize,
        tone: &'static str,
        placeholder: String,
    },
}

/// A subject/body pair for one tone. Both strings may contain `[name]` placeholders.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Template {
    pub tone: Tone,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    templates: Vec<Template>,
}

/// Validated catalog. Every tone has at least one template and every
/// placeholder in every template has a substitution rule.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    by_tone: HashMap<Tone, Vec<Template>>,
}

impl TemplateCatalog {
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_toml_str(EMBEDDED_CATALOG)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(raw)?;
        Self::from_templates(file.templates)
    }

    pub fn from_templates(templates: Vec<Template>) -> Result<Self, CatalogError> {
        for (index, template) in templates.iter().enumerate() {
            let unknown = find_placeholders(&template.subject)
                .chain(find_placeholders(&template.body))
                .find(|name| !has_rule(name));
            if let Some(placeholder) = unknown {
                return Err(CatalogError::UnknownPlaceholder {
                    index,
                    tone: template.tone.as_str(),
                    placeholder: placeholder.to_string(),
                });
            }
        }

        let mut by_tone: HashMap<Tone, Vec<Template>> = HashMap::new();
        for template in templates {
            by_tone.entry(template.tone).or_default().push(template);
        }

        if let Some(missing) = Tone::ALL.iter().find(|t| !by_tone.contains_key(t)) {
            return Err(CatalogError::MissingTone(missing.as_str()));
        }

        Ok(Self { by_tone })
    }

    /// Templates for `tone`. Never empty for a constructed catalog.
    pub fn templates_for(&self, tone: Tone) -> &[Template] {
        self.by_tone.get(&tone).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Selects one of `tone`'s templates using `picker`.
    pub fn pick(&self, tone: Tone, picker: &dyn TemplatePicker) -> &Template {
        let templates = self.templates_for(tone);
        // Construction guarantees at least one template per tone
        let index = picker.pick(templates.len()) % templates.len();
        &templates[index]
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        Tone::ALL
            .iter()
            .flat_map(move |tone| self.templates_for(*tone).iter())
    }
}

/// Source of template choice. Injected so tests can pin a template.
pub trait TemplatePicker: Send + Sync {
    /// Returns an index in `0..len`. `len` is always at least 1.
    fn pick(&self, len: usize) -> usize;
}

/// Uniform random selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl TemplatePicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always the same index (wrapped into range).
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

#[cfg(test)]
impl TemplatePicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn template(tone: Tone, subject: &str, body: &str) -> Template {
        Template {
            tone,
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }

    fn one_per_tone() -> Vec<Template> {
        Tone::ALL
            .iter()
            .map(|t| template(*t, "Application for [Position]", "Hello [relevant field]"))
            .collect()
    }

    #[test]
    fn test_embedded_catalog_is_valid() {
        let catalog = TemplateCatalog::embedded().unwrap();
        for tone in Tone::ALL {
            assert!(
                catalog.templates_for(tone).len() >= 2,
                "tone {tone:?} needs at least two templates"
            );
        }
    }

    #[test]
    fn test_templates_are_grouped_by_tone() {
        let catalog = TemplateCatalog::embedded().unwrap();
        for tone in Tone::ALL {
            assert!(catalog.templates_for(tone).iter().all(|t| t.tone == tone));
        }
        assert_eq!(catalog.iter().count(), catalog.len());
    }

    #[test]
    fn test_missing_tone_rejected() {
        let templates = vec![template(Tone::Formal, "Hi", "Body")];
        let err = TemplateCatalog::from_templates(templates).unwrap_err();
        assert!(matches!(err, CatalogError::MissingTone("friendly")));
    }

    #[test]
    fn test_unknown_placeholder_rejected() {
        let mut templates = one_per_tone();
        templates.push(template(Tone::Academic, "Hi", "Dear [Favourite Colour],"));
        let err = TemplateCatalog::from_templates(templates).unwrap_err();
        match err {
            CatalogError::UnknownPlaceholder {
                index,
                tone,
                placeholder,
            } => {
                assert_eq!(index, 4);
                assert_eq!(tone, "academic");
                assert_eq!(placeholder, "Favourite Colour");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let err = TemplateCatalog::from_toml_str("templates = 5").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_unknown_tone_in_toml_rejected() {
        let raw = r#"
            [[templates]]
            tone = "sarcastic"
            subject = "x"
            body = "y"
        "#;
        assert!(matches!(
            TemplateCatalog::from_toml_str(raw),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_catalog_loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EMBEDDED_CATALOG.as_bytes()).unwrap();
        let catalog = TemplateCatalog::from_path(file.path()).unwrap();
        assert_eq!(catalog.len(), TemplateCatalog::embedded().unwrap().len());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TemplateCatalog::from_path(Path::new("/nonexistent/catalog.toml")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_fixed_picker_pins_template() {
        let catalog = TemplateCatalog::embedded().unwrap();
        let first = catalog.pick(Tone::Friendly, &FixedPicker(0));
        let second = catalog.pick(Tone::Friendly, &FixedPicker(1));
        assert_eq!(first, &catalog.templates_for(Tone::Friendly)[0]);
        assert_eq!(second, &catalog.templates_for(Tone::Friendly)[1]);
        // out-of-range indices wrap
        let wrapped = catalog.pick(Tone::Friendly, &FixedPicker(catalog.templates_for(Tone::Friendly).len()));
        assert_eq!(wrapped, first);
    }

    #[test]
    fn test_random_picker_stays_within_tone() {
        let catalog = TemplateCatalog::embedded().unwrap();
        for _ in 0..50 {
            let picked = catalog.pick(Tone::Academic, &RandomPicker);
            assert_eq!(picked.tone, Tone::Academic);
        }
    }

    #[test]
    fn test_random_picker_in_range() {
        for len in 1..5 {
            for _ in 0..20 {
                assert!(RandomPicker.pick(len) < len);
            }
        }
    }
}
