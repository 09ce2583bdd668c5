//! # Corpus Validator
//!
//! Validation for a multi-language markdown documentation corpus whose files
//! carry `+++`-delimited frontmatter.
//!
//! It answers three questions about the corpus:
//!
//! 1. Is each file's metadata well-formed and complete?
//! 2. Do internal links resolve to real pages?
//! 3. How much of the English source has been translated into each language,
//!    per section, and how good are the translated titles and descriptions?
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Corpus walk │──▶│ ContentIndex │──▶│  Validator   │──▶ findings
//! │  (walkdir)  │   │ EN + presence│   │ fm / links   │
//! └─────────────┘   └──────┬───────┘   └──────────────┘
//!                          │
//!                          ▼
//!                   ┌──────────────┐
//!                   │   coverage   │──▶ per-language table
//!                   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! corpus check                      # all checks, text report
//! corpus check --links --strict     # fail on broken links too
//! corpus check --json > report.json
//! corpus coverage                   # translation dashboard
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Languages, sections, and rule limits |
//! | [`models`] | Content items and the finding taxonomy |
//! | [`frontmatter`] | Tolerant `+++` frontmatter parser |
//! | [`index`] | Corpus walk and content index |
//! | [`links`] | Link extraction and resolution |
//! | [`coverage`] | Translation coverage aggregation |
//! | [`validate`] | Check orchestration |
//! | [`report`] | Text and JSON rendering |
//! | [`progress`] | Progress reporting on stderr |

pub mod config;
pub mod coverage;
pub mod frontmatter;
pub mod index;
pub mod links;
pub mod models;
pub mod progress;
pub mod report;
pub mod validate;
