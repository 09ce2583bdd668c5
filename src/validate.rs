//! Validation orchestrator.
//!
//! Builds the [`ContentIndex`] once, then runs the selected checks over it:
//! frontmatter rules and internal links per file, and translation coverage
//! across languages. Every problem becomes a [`Finding`]; nothing short of a
//! missing corpus root stops the run.

use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, info, trace};

use crate::config::Config;
use crate::coverage::{self, CoverageRecord};
use crate::frontmatter::{self, Frontmatter};
use crate::index::{read_source, ContentIndex, CorpusFile};
use crate::links::{self, PageSet};
use crate::models::{sort_findings, Finding, FindingKind, Severity};
use crate::progress::{NoProgress, ProgressEvent, ProgressReporter};

/// Which checks to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checks {
    pub frontmatter: bool,
    pub links: bool,
    pub coverage: bool,
}

impl Checks {
    pub fn all() -> Self {
        Self {
            frontmatter: true,
            links: true,
            coverage: true,
        }
    }

    /// Nothing selected means everything.
    pub fn or_all(self) -> Self {
        if self == Self::default() {
            Self::all()
        } else {
            self
        }
    }
}

/// Number of files each per-file check examined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontmatter_files: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_files: Option<usize>,
}

/// Everything a run produced, handed to the reporting layer.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Sorted: errors, warnings, infos, then by path.
    pub findings: Vec<Finding>,
    pub stats: Stats,
    /// English files found under the configured sections.
    pub source_files: usize,
    pub coverage: Option<BTreeMap<String, CoverageRecord>>,
}

impl ValidationReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity() == severity)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Any error fails the run; in strict mode any warning does too.
    pub fn is_failure(&self, strict: bool) -> bool {
        self.error_count() > 0 || (strict && self.warning_count() > 0)
    }
}

pub struct Validator<'a> {
    config: &'a Config,
    progress: &'a dyn ProgressReporter,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            progress: &NoProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn run(&self, checks: Checks) -> Result<ValidationReport> {
        self.progress.report(ProgressEvent::Indexing {
            root: self.config.corpus.root.display().to_string(),
        });
        let index = ContentIndex::build(self.config)?;
        self.run_on(&index, checks)
    }

    /// Run `checks` against an already built index.
    pub fn run_on(&self, index: &ContentIndex, checks: Checks) -> Result<ValidationReport> {
        let mut report = ValidationReport {
            source_files: index.english_count(),
            ..ValidationReport::default()
        };
        let mut findings: Vec<Finding> = index.issues().to_vec();
        // Each unreadable file is reported once, by whichever stage reads it first.
        let mut unreadable: HashSet<PathBuf> =
            findings.iter().filter_map(|f| f.file.clone()).collect();

        if checks.frontmatter || checks.links {
            self.check_files(index, checks, &mut report.stats, &mut unreadable, &mut findings);
        }

        if checks.coverage {
            let coverage = coverage::aggregate(index, self.config);
            findings.extend(
                coverage
                    .issues
                    .into_iter()
                    .filter(|f| f.file.as_ref().map_or(true, |p| !unreadable.contains(p))),
            );
            report.coverage = Some(coverage.languages);
        }

        sort_findings(&mut findings);
        info!(
            findings = findings.len(),
            errors = findings.iter().filter(|f| f.severity() == Severity::Error).count(),
            "validation finished"
        );
        report.findings = findings;
        Ok(report)
    }

    fn check_files(
        &self,
        index: &ContentIndex,
        checks: Checks,
        stats: &mut Stats,
        unreadable: &mut HashSet<PathBuf>,
        findings: &mut Vec<Finding>,
    ) {
        let pages = checks
            .links
            .then(|| PageSet::from_index(index, self.config));
        if let Some(pages) = &pages {
            debug!(pages = pages.len(), "built page set");
        }

        let mut frontmatter_files = 0;
        let mut link_files = 0;
        let total = index.files().len() as u64;

        for (n, file) in index.files().iter().enumerate() {
            self.progress.report(ProgressEvent::Checking {
                check: "files",
                n: n as u64 + 1,
                total,
            });

            if unreadable.contains(&file.relative_path) {
                continue;
            }
            let raw = match read_source(file) {
                Ok(raw) => raw,
                Err(err) => {
                    unreadable.insert(file.relative_path.clone());
                    findings.push(Finding::new(
                        file.relative_path.clone(),
                        FindingKind::UnreadableFile(format!("{:#}", err)),
                    ));
                    continue;
                }
            };
            let (fm, body) = frontmatter::parse(&raw);

            if checks.frontmatter {
                for kind in frontmatter_findings(file, &fm, self.config) {
                    findings.push(Finding::new(file.relative_path.clone(), kind));
                }
                if !fm.is_empty() {
                    frontmatter_files += 1;
                }
            }

            if let Some(pages) = &pages {
                for kind in link_findings(file, &body, pages) {
                    findings.push(Finding::new(file.relative_path.clone(), kind));
                }
                link_files += 1;
            }
        }

        if checks.frontmatter {
            stats.frontmatter_files = Some(frontmatter_files);
        }
        if checks.links {
            stats.link_files = Some(link_files);
        }
    }
}

/// Frontmatter rule violations for one file.
///
/// An empty mapping yields only `MissingFrontmatter` (nothing for
/// `_index.md`); the remaining rules apply to files that have metadata.
pub fn frontmatter_findings(file: &CorpusFile, fm: &Frontmatter, config: &Config) -> Vec<FindingKind> {
    let mut found = Vec::new();

    if fm.is_empty() {
        if !file.is_section_index() {
            found.push(FindingKind::MissingFrontmatter);
        }
        return found;
    }

    let section = file.section.as_deref();
    for field in config.required_fields(section, file.is_translation(config)) {
        if !fm.contains_key(field) {
            found.push(FindingKind::MissingRequiredField(field.clone()));
        }
    }

    if let (Some(section), Some(template)) = (section, fm.get("template")) {
        let allowed = config.valid_templates(section);
        let accepted = template
            .as_str()
            .is_some_and(|t| allowed.iter().any(|a| a == t));
        if !allowed.is_empty() && !accepted {
            found.push(FindingKind::InvalidTemplate {
                got: template.to_text().unwrap_or_default(),
                section: section.to_string(),
                allowed: allowed.to_vec(),
            });
        }
    }

    let rules = &config.rules;
    if let Some(description) = fm.get("description").and_then(|v| v.as_str()) {
        let actual = description.chars().count();
        if actual < rules.description_min || actual > rules.description_max {
            found.push(FindingKind::DescriptionLengthOutOfRange {
                actual,
                min: rules.description_min,
                max: rules.description_max,
            });
        }
    }

    if let Some(title) = fm.get("title").and_then(|v| v.as_str()) {
        let actual = title.chars().count();
        if actual > rules.title_max {
            found.push(FindingKind::TitleTooLong {
                actual,
                max: rules.title_max,
            });
        }
    }

    found
}

/// Broken or invalid internal links in one file's body.
pub fn link_findings(file: &CorpusFile, body: &str, pages: &PageSet) -> Vec<FindingKind> {
    let wiki_links = links::find_wiki_links(body);
    if !wiki_links.is_empty() {
        trace!(
            path = %file.relative_path.display(),
            count = wiki_links.len(),
            "wiki-style links are not validated"
        );
    }

    links::find_links(body)
        .iter()
        .filter_map(|link| links::resolve(link, pages, &file.relative_path).finding(link))
        .collect()
}
