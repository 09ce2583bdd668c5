//! Terminal and JSON rendering of validation results.
//!
//! Every renderer returns a `String`; the binary decides where it goes.

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::config::Config;
use crate::coverage::CoverageRecord;
use crate::models::Severity;
use crate::validate::{Stats, ValidationReport};

const RULE_WIDTH: usize = 50;
const BAR_WIDTH: usize = 30;

#[derive(Serialize)]
struct JsonFinding {
    file: Option<String>,
    message: String,
    severity: Severity,
}

#[derive(Serialize)]
struct JsonCheckReport<'a> {
    errors: Vec<JsonFinding>,
    stats: &'a Stats,
    coverage: BTreeMap<&'a str, &'a CoverageRecord>,
}

/// `check --json` output: findings, stats, and coverage.
pub fn render_check_json(report: &ValidationReport) -> Result<String> {
    let out = JsonCheckReport {
        errors: report
            .findings
            .iter()
            .map(|f| JsonFinding {
                file: f.file.as_ref().map(|_| f.display_path()),
                message: f.message(),
                severity: f.severity(),
            })
            .collect(),
        stats: &report.stats,
        coverage: report
            .coverage
            .iter()
            .flatten()
            .map(|(lang, record)| (lang.as_str(), record))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

/// `check` text output: the issue list and the coverage bars.
pub fn render_check_text(report: &ValidationReport) -> String {
    let mut out = String::new();

    if !report.findings.is_empty() {
        let _ = writeln!(out, "\n{}", "=".repeat(RULE_WIDTH));
        let _ = writeln!(out, "Issues Found:");
        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
        for finding in &report.findings {
            let _ = writeln!(out, "{} {}", icon(finding.severity()), finding);
        }
    }

    if let Some(coverage) = report.coverage.as_ref().filter(|c| !c.is_empty()) {
        let _ = writeln!(out, "\nTranslation Coverage Report");
        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
        for (lang, record) in coverage {
            let _ = writeln!(
                out,
                "{:<8} [{}] {:5.1}% ({}/{})",
                lang,
                progress_bar(record.percent()),
                record.percent(),
                record.translated_files,
                record.total_files
            );
        }
        out.push('\n');
    }

    out
}

/// Final one-line summary, printed whatever the output format.
pub fn render_summary(report: &ValidationReport) -> String {
    format!(
        "{}\nSummary: {} errors, {} warnings",
        "=".repeat(RULE_WIDTH),
        report.error_count(),
        report.warning_count()
    )
}

#[derive(Serialize)]
struct JsonDashboard<'a> {
    generated: String,
    source_files: usize,
    languages: &'a BTreeMap<String, String>,
    coverage: &'a BTreeMap<String, CoverageRecord>,
}

/// `coverage --json` output.
pub fn render_dashboard_json(
    config: &Config,
    source_files: usize,
    coverage: &BTreeMap<String, CoverageRecord>,
    generated: DateTime<Local>,
) -> Result<String> {
    let out = JsonDashboard {
        generated: generated.to_rfc3339(),
        source_files,
        languages: &config.languages.names,
        coverage,
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

/// `coverage` terminal dashboard.
///
/// `top` limits how many missing files are listed for each of the two
/// least-covered languages.
pub fn render_dashboard_text(
    config: &Config,
    source_files: usize,
    coverage: &BTreeMap<String, CoverageRecord>,
    generated: DateTime<Local>,
    top: usize,
) -> String {
    let mut out = String::new();
    let wide = "=".repeat(70);
    let thin = format!("  {}", "-".repeat(66));
    // Only sections with English files; empty section directories are not counted.
    let sections: Vec<&str> = config
        .section_names()
        .filter(|s| coverage.values().any(|r| r.sections.contains_key(*s)))
        .collect();

    let _ = writeln!(out, "\n{}", wide);
    let _ = writeln!(out, "  TRANSLATION COVERAGE DASHBOARD");
    let _ = writeln!(out, "  Generated: {}", generated.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "{}", wide);
    let _ = writeln!(
        out,
        "\n  Source Content: {} {} files across {} sections\n",
        source_files,
        config.languages.display_name(&config.languages.source),
        sections.len()
    );

    let _ = writeln!(out, "{}", thin);
    let _ = writeln!(
        out,
        "  {:<15} {:>10} {:>35} {:>8}",
        "Language", "Coverage", "Progress", "Missing"
    );
    let _ = writeln!(out, "{}", thin);
    for lang in &config.languages.translations {
        let Some(record) = coverage.get(lang) else {
            continue;
        };
        let pct = record.percent();
        let name = format!("{} ({})", config.languages.display_name(lang), lang);
        let _ = writeln!(
            out,
            "  {} {:<13} {:>6.1}%   [{}] {:>6}",
            status_mark(pct),
            name,
            pct,
            progress_bar(pct),
            record.missing_count()
        );
    }
    let _ = writeln!(out, "{}", thin);

    let _ = writeln!(out, "\n  SECTION BREAKDOWN:");
    let _ = writeln!(out, "{}", thin);
    for section in &sections {
        let total = coverage
            .values()
            .find_map(|r| r.sections.get(*section))
            .map(|s| s.total)
            .unwrap_or_default();
        let _ = writeln!(out, "\n  {} ({} files)", section.to_uppercase(), total);
        for lang in &config.languages.translations {
            if let Some(stats) = coverage.get(lang).and_then(|r| r.sections.get(*section)) {
                let _ = writeln!(
                    out,
                    "    {:>7}: {:>3}/{:>3} ({:>5.1}%)",
                    lang,
                    stats.translated,
                    stats.total,
                    stats.percent()
                );
            }
        }
    }

    let _ = writeln!(out, "\n  PRIORITY TRANSLATIONS (most needed):");
    let _ = writeln!(out, "{}", thin);
    for lang in least_covered(coverage, 2) {
        let record = &coverage[lang];
        if record.missing.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            "\n  {} - Top {} missing:",
            config.languages.display_name(lang),
            top
        );
        for path in record.missing.iter().take(top) {
            let _ = writeln!(out, "    - {}", path);
        }
    }

    let _ = writeln!(out, "\n{}\n", wide);
    out
}

/// Languages with the lowest coverage, lowest first; ties by code.
fn least_covered(coverage: &BTreeMap<String, CoverageRecord>, n: usize) -> Vec<&str> {
    let mut langs: Vec<(&str, f64)> = coverage
        .iter()
        .map(|(lang, record)| (lang.as_str(), record.percent()))
        .collect();
    langs.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    langs.into_iter().take(n).map(|(lang, _)| lang).collect()
}

fn progress_bar(pct: f64) -> String {
    let filled = ((BAR_WIDTH as f64 * pct / 100.0) as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn status_mark(pct: f64) -> &'static str {
    if pct >= 80.0 {
        "✓"
    } else if pct >= 50.0 {
        "○"
    } else {
        "✗"
    }
}

fn icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "❌",
        Severity::Warning => "⚠️",
        Severity::Info => "ℹ️",
    }
}
