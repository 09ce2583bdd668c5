//! Translation coverage aggregation.
//!
//! For every translation language, each English `(section, path)` pair is
//! visited once. A mirrored file under `{lang}/{section}/{path}` counts as
//! translated; its own frontmatter then feeds the quality counters. Missing
//! files are listed flat (`section/path`) and per section with the English
//! title, so the most visible pages can be prioritized.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::Config;
use crate::index::ContentIndex;
use crate::models::{Finding, FindingKind};

/// A missing translation with the English title for context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingEntry {
    /// Section-relative path.
    pub path: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionCoverage {
    pub total: usize,
    pub translated: usize,
    pub missing: Vec<MissingEntry>,
}

impl SectionCoverage {
    pub fn percent(&self) -> f64 {
        percent(self.translated, self.total)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub with_title: usize,
    pub with_description: usize,
    /// Sum of description lengths in characters.
    pub description_length_total: usize,
    /// Mean description length over files with a description; 0 when none.
    pub avg_description_len: f64,
}

impl QualityMetrics {
    fn freeze(&mut self) {
        self.avg_description_len = if self.with_description > 0 {
            self.description_length_total as f64 / self.with_description as f64
        } else {
            0.0
        };
    }
}

/// Coverage of one translation language against the English source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageRecord {
    pub total_files: usize,
    pub translated_files: usize,
    /// Section-qualified paths (`wiki/elohim.md`).
    pub missing: Vec<String>,
    pub sections: BTreeMap<String, SectionCoverage>,
    pub quality: QualityMetrics,
}

impl CoverageRecord {
    pub fn percent(&self) -> f64 {
        percent(self.translated_files, self.total_files)
    }

    pub fn missing_count(&self) -> usize {
        self.total_files - self.translated_files
    }
}

/// Coverage for every translation language plus any read failures met
/// while loading translated files.
#[derive(Debug, Clone, Default)]
pub struct Coverage {
    pub languages: BTreeMap<String, CoverageRecord>,
    pub issues: Vec<Finding>,
}

/// Compare each translation language against the English source files.
pub fn aggregate(index: &ContentIndex, config: &Config) -> Coverage {
    let mut coverage = Coverage::default();

    for language in &config.languages.translations {
        let mut record = CoverageRecord::default();

        for section in index.sections() {
            let Some(items) = index.english_items(section) else {
                continue;
            };
            let mut section_stats = SectionCoverage {
                total: items.len(),
                ..SectionCoverage::default()
            };

            for (relative_path, english) in items {
                record.total_files += 1;

                if !index.has_translation(language, section, relative_path) {
                    record.missing.push(format!("{}/{}", section, relative_path));
                    section_stats.missing.push(MissingEntry {
                        path: relative_path.clone(),
                        title: english.title(),
                    });
                    continue;
                }

                record.translated_files += 1;
                section_stats.translated += 1;

                match index.load_translation(language, section, relative_path) {
                    Ok(item) => {
                        if item.frontmatter.has_value("title") {
                            record.quality.with_title += 1;
                        }
                        if item.frontmatter.has_value("description") {
                            record.quality.with_description += 1;
                            record.quality.description_length_total +=
                                item.description().chars().count();
                        }
                    }
                    Err(err) => {
                        warn!(language = %language, path = %relative_path, "unreadable translation: {:#}", err);
                        coverage.issues.push(Finding::new(
                            std::path::Path::new(language).join(section).join(relative_path),
                            FindingKind::UnreadableFile(format!("{:#}", err)),
                        ));
                    }
                }
            }

            record.sections.insert(section.to_string(), section_stats);
        }

        record.quality.freeze();
        debug!(
            language = %language,
            translated = record.translated_files,
            total = record.total_files,
            "coverage computed"
        );
        coverage.languages.insert(language.clone(), record);
    }

    coverage
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn build(root: &Path) -> (ContentIndex, Config) {
        let mut config = Config::default();
        config.corpus.root = root.to_path_buf();
        (ContentIndex::build(&config).unwrap(), config)
    }

    #[test]
    fn counts_translated_and_missing_per_section() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "wiki/a.md", "+++\ntitle = \"Alpha\"\n+++\n");
        write(root, "wiki/b.md", "+++\ntitle = \"Beta\"\n+++\n");
        write(root, "timeline/c.md", "+++\ntitle = \"Gamma\"\n+++\n");
        write(
            root,
            "de/wiki/a.md",
            "+++\ntitle = \"Alpha DE\"\ndescription = \"abcd\"\n+++\n",
        );
        write(root, "de/timeline/c.md", "+++\ntitle = \"\"\n+++\n");

        let (index, config) = build(root);
        let coverage = aggregate(&index, &config);
        assert!(coverage.issues.is_empty());
        assert_eq!(coverage.languages.len(), 8);

        let de = &coverage.languages["de"];
        assert_eq!(de.total_files, 3);
        assert_eq!(de.translated_files, 2);
        assert_eq!(de.missing, vec!["wiki/b.md".to_string()]);
        assert_eq!(de.sections["wiki"].total, 2);
        assert_eq!(de.sections["wiki"].translated, 1);
        assert_eq!(
            de.sections["wiki"].missing,
            vec![MissingEntry {
                path: "b.md".to_string(),
                title: "Beta".to_string()
            }]
        );
        assert_eq!(de.sections["timeline"].translated, 1);
        assert_eq!(de.quality.with_title, 1);
        assert_eq!(de.quality.with_description, 1);
        assert_eq!(de.quality.avg_description_len, 4.0);

        let fr = &coverage.languages["fr"];
        assert_eq!(fr.translated_files, 0);
        assert_eq!(fr.missing.len(), 3);
        assert_eq!(fr.quality.avg_description_len, 0.0);
    }

    #[test]
    fn totals_balance_for_every_language() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        for i in 0..5 {
            write(root, &format!("essentials/p{}.md", i), "+++\ntitle = \"P\"\n+++\n");
        }
        write(root, "ja/essentials/p1.md", "+++\ntitle = \"P\"\n+++\n");
        write(root, "ja/essentials/extra.md", "+++\ntitle = \"Only in ja\"\n+++\n");

        let (index, config) = build(root);
        let coverage = aggregate(&index, &config);
        for record in coverage.languages.values() {
            assert_eq!(record.total_files, index.english_count());
            assert_eq!(
                record.translated_files + record.missing.len(),
                record.total_files
            );
        }
        assert_eq!(coverage.languages["ja"].translated_files, 1);
    }

    #[test]
    fn description_length_counts_characters() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "wiki/a.md", "+++\ntitle = \"A\"\n+++\n");
        write(root, "wiki/b.md", "+++\ntitle = \"B\"\n+++\n");
        write(root, "ko/wiki/a.md", "+++\ndescription = \"한국어\"\n+++\n");
        write(root, "ko/wiki/b.md", "+++\ndescription = \"abcde\"\n+++\n");

        let (index, config) = build(root);
        let coverage = aggregate(&index, &config);
        let ko = &coverage.languages["ko"];
        assert_eq!(ko.quality.with_title, 0);
        assert_eq!(ko.quality.with_description, 2);
        assert_eq!(ko.quality.description_length_total, 8);
        assert_eq!(ko.quality.avg_description_len, 4.0);
    }

    #[test]
    fn percent_handles_empty_totals() {
        let record = CoverageRecord::default();
        assert_eq!(record.percent(), 0.0);
        let section = SectionCoverage {
            total: 4,
            translated: 1,
            missing: Vec::new(),
        };
        assert_eq!(section.percent(), 25.0);
    }
}
