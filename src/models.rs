//! Core data models shared by the index, the checks, and the reports.
//!
//! A [`ContentItem`] is one parsed markdown file. A [`Finding`] is one
//! problem reported against the corpus, typed by [`FindingKind`].

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::frontmatter::Frontmatter;

/// One source or translated markdown file.
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Corpus-relative path, section-qualified (`wiki/elohim.md`,
    /// `de/wiki/elohim.md`).
    pub relative_path: PathBuf,
    pub language: String,
    pub section: Option<String>,
    pub frontmatter: Frontmatter,
    pub body: String,
    /// Whitespace-separated token count of the raw text.
    pub word_count: usize,
}

impl ContentItem {
    /// The `title` as text, or empty when absent.
    pub fn title(&self) -> String {
        self.frontmatter.text("title").unwrap_or_default()
    }

    /// The `description` as text, or empty when absent.
    pub fn description(&self) -> String {
        self.frontmatter.text("description").unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the validator can report. The `Display` output is the
/// human-readable message shown in reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FindingKind {
    #[error("Missing frontmatter")]
    MissingFrontmatter,

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("Invalid template '{got}' for section '{section}'")]
    InvalidTemplate {
        got: String,
        section: String,
        allowed: Vec<String>,
    },

    #[error("{}", describe_length(.actual, .min, .max))]
    DescriptionLengthOutOfRange { actual: usize, min: usize, max: usize },

    #[error("Title too long ({actual} chars, max {max} for SEO)")]
    TitleTooLong { actual: usize, max: usize },

    #[error("Broken internal link: {0}")]
    BrokenInternalLink(String),

    #[error("Invalid relative link: {0}")]
    InvalidRelativeLink(String),

    #[error("Unreadable file: {0}")]
    UnreadableFile(String),

    /// Only ever surfaced through the coverage table.
    #[error("Missing translation: {0}")]
    MissingTranslation(String),
}

fn describe_length(actual: &usize, min: &usize, max: &usize) -> String {
    if actual < min {
        format!("Description too short ({} chars, min {})", actual, min)
    } else {
        format!("Description too long ({} chars, max {})", actual, max)
    }
}

impl FindingKind {
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::MissingFrontmatter
            | FindingKind::MissingRequiredField(_)
            | FindingKind::UnreadableFile(_) => Severity::Error,
            FindingKind::InvalidTemplate { .. }
            | FindingKind::DescriptionLengthOutOfRange { .. }
            | FindingKind::TitleTooLong { .. }
            | FindingKind::BrokenInternalLink(_)
            | FindingKind::InvalidRelativeLink(_) => Severity::Warning,
            FindingKind::MissingTranslation(_) => Severity::Info,
        }
    }
}

/// One reported problem. `file` is corpus-relative, or `None` for
/// corpus-wide issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub file: Option<PathBuf>,
    pub kind: FindingKind,
}

impl Finding {
    pub fn new(file: impl Into<PathBuf>, kind: FindingKind) -> Self {
        Self {
            file: Some(file.into()),
            kind,
        }
    }

    pub fn corpus_wide(kind: FindingKind) -> Self {
        Self { file: None, kind }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Path rendered with `/` separators, or `N/A` for corpus-wide findings.
    pub fn display_path(&self) -> String {
        self.file
            .as_ref()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|| "N/A".to_string())
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.severity().as_str().to_uppercase(),
            self.display_path(),
            self.kind
        )
    }
}

/// Errors first, then warnings, then infos; ties broken by path with
/// corpus-wide findings leading. The sort is stable.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        a.severity()
            .cmp(&b.severity())
            .then_with(|| a.file.cmp(&b.file))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_report_wording() {
        let short = FindingKind::DescriptionLengthOutOfRange {
            actual: 12,
            min: 50,
            max: 300,
        };
        assert_eq!(short.to_string(), "Description too short (12 chars, min 50)");

        let long = FindingKind::DescriptionLengthOutOfRange {
            actual: 301,
            min: 50,
            max: 300,
        };
        assert_eq!(long.to_string(), "Description too long (301 chars, max 300)");

        let template = FindingKind::InvalidTemplate {
            got: "page.html".into(),
            section: "wiki".into(),
            allowed: vec!["wiki-page.html".into()],
        };
        assert_eq!(
            template.to_string(),
            "Invalid template 'page.html' for section 'wiki'"
        );
        assert_eq!(
            FindingKind::TitleTooLong { actual: 80, max: 70 }.to_string(),
            "Title too long (80 chars, max 70 for SEO)"
        );
    }

    #[test]
    fn severities_follow_taxonomy() {
        assert_eq!(FindingKind::MissingFrontmatter.severity(), Severity::Error);
        assert_eq!(
            FindingKind::MissingRequiredField("title".into()).severity(),
            Severity::Error
        );
        assert_eq!(
            FindingKind::BrokenInternalLink("/x/".into()).severity(),
            Severity::Warning
        );
        assert_eq!(
            FindingKind::MissingTranslation("wiki/a.md".into()).severity(),
            Severity::Info
        );
    }

    #[test]
    fn sort_puts_errors_first_then_paths() {
        let mut findings = vec![
            Finding::new("wiki/b.md", FindingKind::BrokenInternalLink("/x/".into())),
            Finding::new("wiki/z.md", FindingKind::MissingFrontmatter),
            Finding::new("wiki/a.md", FindingKind::BrokenInternalLink("/y/".into())),
            Finding::new("wiki/c.md", FindingKind::MissingFrontmatter),
        ];
        sort_findings(&mut findings);
        let order: Vec<String> = findings.iter().map(|f| f.display_path()).collect();
        assert_eq!(order, vec!["wiki/c.md", "wiki/z.md", "wiki/a.md", "wiki/b.md"]);
    }

    #[test]
    fn display_includes_severity_and_path() {
        let finding = Finding::new("wiki/a.md", FindingKind::MissingFrontmatter);
        assert_eq!(finding.to_string(), "[ERROR] wiki/a.md: Missing frontmatter");
        let wide = Finding::corpus_wide(FindingKind::UnreadableFile("boom".into()));
        assert_eq!(wide.display_path(), "N/A");
    }
}
