//! Corpus walker and content index.
//!
//! One recursive walk of the corpus root collects every markdown file
//! (`README.md` never counts as content). English files under a configured
//! section are parsed immediately so later stages can read their titles and
//! descriptions without touching the disk again. Translated files are only
//! recorded as present; their content is parsed on demand through
//! [`ContentIndex::load_translation`].

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::frontmatter;
use crate::models::{ContentItem, Finding, FindingKind};

/// Landing page of a section or subsection.
pub const SECTION_INDEX_FILE: &str = "_index.md";

/// Never treated as content.
pub const README_FILE: &str = "README.md";

const DEFAULT_EXCLUDES: &[&str] = &["**/.git/**", "**/node_modules/**", "**/target/**"];

/// A markdown file found under the corpus root.
#[derive(Debug, Clone)]
pub struct CorpusFile {
    pub path: PathBuf,
    /// Path relative to the corpus root.
    pub relative_path: PathBuf,
    pub language: String,
    pub section: Option<String>,
}

impl CorpusFile {
    pub fn is_translation(&self, config: &Config) -> bool {
        self.language != config.languages.source
    }

    pub fn is_section_index(&self) -> bool {
        self.relative_path
            .file_name()
            .is_some_and(|n| n == SECTION_INDEX_FILE)
    }
}

pub struct ContentIndex {
    root: PathBuf,
    source_language: String,
    files: Vec<CorpusFile>,
    /// section -> section-relative path -> parsed English item
    english: BTreeMap<String, BTreeMap<String, ContentItem>>,
    /// language -> section -> section-relative paths present on disk
    translations: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
    issues: Vec<Finding>,
}

impl ContentIndex {
    /// Walk `config.corpus.root` and index every markdown file.
    ///
    /// Fails only when the root itself is missing. Files that cannot be read
    /// are recorded in [`ContentIndex::issues`] and skipped.
    pub fn build(config: &Config) -> Result<Self> {
        let root = config.corpus.root.clone();
        if !root.is_dir() {
            bail!("Corpus root does not exist: {}", root.display());
        }

        let mut excludes: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
        excludes.extend(config.corpus.exclude_globs.iter().cloned());
        let exclude_set = build_globset(&excludes)?;

        let mut index = ContentIndex {
            root: root.clone(),
            source_language: config.languages.source.clone(),
            files: Vec::new(),
            english: BTreeMap::new(),
            translations: BTreeMap::new(),
            issues: Vec::new(),
        };

        let walker = WalkDir::new(&root)
            .follow_links(config.corpus.follow_symlinks)
            .sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let file = err
                        .path()
                        .map(|p| p.strip_prefix(&root).unwrap_or(p).to_path_buf());
                    let kind = FindingKind::UnreadableFile(err.to_string());
                    index.issues.push(match file {
                        Some(file) => Finding::new(file, kind),
                        None => Finding::corpus_wide(kind),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(&root).unwrap_or(path).to_path_buf();
            if exclude_set.is_match(&relative) {
                debug!(path = %relative.display(), "excluded by glob");
                continue;
            }

            let (language, section) = classify(&relative, config);
            index.add_file(CorpusFile {
                path: path.to_path_buf(),
                relative_path: relative,
                language,
                section,
            });
        }

        info!(
            root = %index.root.display(),
            files = index.files.len(),
            english = index.english_count(),
            "indexed corpus"
        );
        Ok(index)
    }

    fn add_file(&mut self, file: CorpusFile) {
        let segments = path_segments(&file.relative_path);
        if let Some(section) = &file.section {
            if file.language == self.source_language && segments.len() > 1 {
                let key = segments[1..].join("/");
                match read_item(&file) {
                    Ok(item) => {
                        self.english
                            .entry(section.clone())
                            .or_default()
                            .insert(key, item);
                    }
                    Err(err) => self.issues.push(Finding::new(
                        file.relative_path.clone(),
                        FindingKind::UnreadableFile(format!("{:#}", err)),
                    )),
                }
            } else if file.language != self.source_language && segments.len() > 2 {
                let key = segments[2..].join("/");
                self.translations
                    .entry(file.language.clone())
                    .or_default()
                    .entry(section.clone())
                    .or_default()
                    .insert(key);
            }
        }
        self.files.push(file);
    }

    /// Every indexed markdown file, in walk order.
    pub fn files(&self) -> &[CorpusFile] {
        &self.files
    }

    /// Read failures met while walking and indexing.
    pub fn issues(&self) -> &[Finding] {
        &self.issues
    }

    /// Sections that have at least one English file, in name order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.english.keys().map(String::as_str)
    }

    /// English items in a section keyed by section-relative path.
    pub fn english_items(&self, section: &str) -> Option<&BTreeMap<String, ContentItem>> {
        self.english.get(section)
    }

    pub fn english_count(&self) -> usize {
        self.english.values().map(BTreeMap::len).sum()
    }

    /// Whether `{lang}/{section}/{relative_path}` exists in the corpus.
    pub fn has_translation(&self, language: &str, section: &str, relative_path: &str) -> bool {
        self.translations
            .get(language)
            .and_then(|sections| sections.get(section))
            .is_some_and(|paths| paths.contains(relative_path))
    }

    /// Read and parse a translated file. Call only after
    /// [`ContentIndex::has_translation`] confirmed it exists.
    pub fn load_translation(
        &self,
        language: &str,
        section: &str,
        relative_path: &str,
    ) -> Result<ContentItem> {
        let relative = Path::new(language).join(section).join(relative_path);
        let file = CorpusFile {
            path: self.root.join(&relative),
            relative_path: relative,
            language: language.to_string(),
            section: Some(section.to_string()),
        };
        read_item(&file)
    }
}

/// Language and section of a corpus-relative path.
///
/// A first segment naming a translation language makes the second segment
/// the section candidate; otherwise the first segment is the candidate.
pub fn classify(relative: &Path, config: &Config) -> (String, Option<String>) {
    let segments = path_segments(relative);
    let first = segments.first().map(String::as_str).unwrap_or_default();

    if config.languages.is_translation(first) {
        let section = segments
            .get(1)
            .filter(|s| config.is_section(s))
            .cloned();
        (first.to_string(), section)
    } else {
        let section = Some(first)
            .filter(|s| config.is_section(s))
            .map(str::to_string);
        (config.languages.source.clone(), section)
    }
}

/// Path components as strings, for `/`-joined keys that do not depend on
/// the platform separator.
pub fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect()
}

/// Raw contents of a corpus file.
pub fn read_source(file: &CorpusFile) -> Result<String> {
    std::fs::read_to_string(&file.path)
        .with_context(|| format!("Failed to read {}", file.relative_path.display()))
}

fn read_item(file: &CorpusFile) -> Result<ContentItem> {
    let raw = read_source(file)?;
    let (frontmatter, body) = frontmatter::parse(&raw);
    Ok(ContentItem {
        relative_path: file.relative_path.clone(),
        language: file.language.clone(),
        section: file.section.clone(),
        frontmatter,
        body,
        word_count: raw.split_whitespace().count(),
    })
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
        && path.file_name().is_some_and(|name| name != README_FILE)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}
