//! Static corpus configuration.
//!
//! The languages, sections, required-field lists, template names, and length
//! limits are closed enumerations. They are built once at startup, either
//! from the built-in defaults or from a TOML file passed via `--config`, and
//! are never discovered by scanning the corpus.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub languages: LanguagesConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default = "default_sections")]
    pub sections: Vec<SectionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig::default(),
            languages: LanguagesConfig::default(),
            rules: RulesConfig::default(),
            sections: default_sections(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Deserialize, Clone)]
pub struct LanguagesConfig {
    #[serde(default = "default_source_language")]
    pub source: String,
    #[serde(default = "default_translations")]
    pub translations: Vec<String>,
    /// Display names keyed by language code, used by the coverage dashboard.
    #[serde(default = "default_language_names")]
    pub names: BTreeMap<String, String>,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            source: default_source_language(),
            translations: default_translations(),
            names: default_language_names(),
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_translations() -> Vec<String> {
    ["de", "es", "fr", "ja", "ko", "ru", "zh", "zh-Hant"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_language_names() -> BTreeMap<String, String> {
    [
        ("en", "English"),
        ("de", "Deutsch"),
        ("es", "Español"),
        ("fr", "Français"),
        ("ja", "日本語"),
        ("ko", "한국어"),
        ("ru", "Русский"),
        ("zh", "简体中文"),
        ("zh-Hant", "繁體中文"),
    ]
    .iter()
    .map(|(code, name)| (code.to_string(), name.to_string()))
    .collect()
}

impl LanguagesConfig {
    pub fn is_translation(&self, code: &str) -> bool {
        self.translations.iter().any(|t| t == code)
    }

    /// Human-readable name for a language code, falling back to the code.
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.names.get(code).map(String::as_str).unwrap_or(code)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RulesConfig {
    #[serde(default = "default_description_min")]
    pub description_min: usize,
    #[serde(default = "default_description_max")]
    pub description_max: usize,
    #[serde(default = "default_title_max")]
    pub title_max: usize,
    /// Required fields for source files outside any known section.
    #[serde(default = "default_fallback_fields")]
    pub default_required_fields: Vec<String>,
    /// Required fields for translated files outside any known section.
    #[serde(default = "default_fallback_fields")]
    pub default_translation_required_fields: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            description_min: default_description_min(),
            description_max: default_description_max(),
            title_max: default_title_max(),
            default_required_fields: default_fallback_fields(),
            default_translation_required_fields: default_fallback_fields(),
        }
    }
}

fn default_description_min() -> usize {
    50
}
fn default_description_max() -> usize {
    300
}
fn default_title_max() -> usize {
    70
}
fn default_fallback_fields() -> Vec<String> {
    vec!["title".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct SectionConfig {
    pub name: String,
    #[serde(default = "default_section_required_fields")]
    pub required_fields: Vec<String>,
    #[serde(default = "default_section_translation_fields")]
    pub translation_required_fields: Vec<String>,
    /// Allowed `template` values. Empty means any template is accepted.
    #[serde(default)]
    pub templates: Vec<String>,
}

fn default_section_required_fields() -> Vec<String> {
    strings(&["title", "description", "template"])
}

fn default_section_translation_fields() -> Vec<String> {
    strings(&["title", "description"])
}

fn default_sections() -> Vec<SectionConfig> {
    let section = |name: &str, templates: &[&str]| SectionConfig {
        name: name.to_string(),
        required_fields: default_section_required_fields(),
        translation_required_fields: default_section_translation_fields(),
        templates: strings(templates),
    };
    vec![
        section("wiki", &["wiki-page.html"]),
        section("timeline", &["timeline-section.html", "timeline-page.html"]),
        section("resources", &["resources-page.html", "resources-section.html"]),
        section(
            "essentials",
            &["essentials-page.html", "essentials-section.html"],
        ),
        section("explainers", &["explainer-page.html"]),
    ]
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Config {
    pub fn section(&self, name: &str) -> Option<&SectionConfig> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn is_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// Required frontmatter keys for a file, given its section and whether
    /// it lives under a translation directory.
    pub fn required_fields(&self, section: Option<&str>, translation: bool) -> &[String] {
        match (section.and_then(|s| self.section(s)), translation) {
            (Some(s), false) => &s.required_fields,
            (Some(s), true) => &s.translation_required_fields,
            (None, false) => &self.rules.default_required_fields,
            (None, true) => &self.rules.default_translation_required_fields,
        }
    }

    /// Allowed templates for a section; empty when unrestricted or unknown.
    pub fn valid_templates(&self, section: &str) -> &[String] {
        self.section(section)
            .map(|s| s.templates.as_slice())
            .unwrap_or(&[])
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.rules.description_min > config.rules.description_max {
        anyhow::bail!(
            "rules.description_min ({}) must be <= rules.description_max ({})",
            config.rules.description_min,
            config.rules.description_max
        );
    }

    if config.sections.is_empty() {
        anyhow::bail!("at least one [[sections]] entry is required");
    }

    let mut seen = HashSet::new();
    for section in &config.sections {
        if section.name.is_empty() || section.name.contains('/') {
            anyhow::bail!("invalid section name: '{}'", section.name);
        }
        if !seen.insert(section.name.as_str()) {
            anyhow::bail!("duplicate section: '{}'", section.name);
        }
    }

    if config.languages.source.is_empty() {
        anyhow::bail!("languages.source must not be empty");
    }
    for code in &config.languages.translations {
        if code.is_empty() {
            anyhow::bail!("languages.translations must not contain empty codes");
        }
        if *code == config.languages.source {
            anyhow::bail!(
                "source language '{}' must not be listed in languages.translations",
                code
            );
        }
    }

    Ok(())
}
