//! # Corpus Validator CLI (`corpus`)
//!
//! ## Usage
//!
//! ```bash
//! corpus [--root <dir>] [--config <file>] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `corpus check` | Validate frontmatter, internal links, and translation coverage |
//! | `corpus coverage` | Print the translation coverage dashboard |
//!
//! Exit status of `check` is 0 when no error was found, 1 otherwise
//! (`--strict` also fails on warnings).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use corpus_validator::config::{self, Config};
use corpus_validator::progress::ProgressMode;
use corpus_validator::report;
use corpus_validator::validate::{Checks, Validator};

/// Corpus Validator: frontmatter, link, and translation coverage checks for
/// multi-language markdown corpora.
#[derive(Parser)]
#[command(
    name = "corpus",
    about = "Validate a multi-language markdown corpus",
    version,
    long_about = "Checks frontmatter completeness, internal link resolution, and \
    translation coverage of a markdown corpus with one directory per section and \
    one directory per translation language."
)]
struct Cli {
    /// Path to a TOML configuration file.
    ///
    /// Without it the built-in languages, sections, and rules are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Corpus root directory. Overrides `corpus.root` from the config file.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Progress output on stderr.
    #[arg(long, global = true, value_enum, default_value = "auto")]
    progress: ProgressMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run validation checks.
    ///
    /// Without a check flag, all checks run.
    Check {
        /// Only validate frontmatter.
        #[arg(long)]
        frontmatter: bool,

        /// Only validate internal links.
        #[arg(long)]
        links: bool,

        /// Only check translation coverage.
        #[arg(long)]
        coverage: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Treat warnings as errors.
        #[arg(long)]
        strict: bool,
    },

    /// Translation coverage dashboard.
    Coverage {
        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Missing files listed per low-coverage language.
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("corpus_validator=warn")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    if let Some(root) = cli.root {
        cfg.corpus.root = root;
    }
    info!(root = %cfg.corpus.root.display(), "loaded configuration");

    let reporter = cli.progress.reporter();
    let validator = Validator::new(&cfg).with_progress(reporter.as_ref());

    match cli.command {
        Commands::Check {
            frontmatter,
            links,
            coverage,
            json,
            strict,
        } => {
            let checks = Checks {
                frontmatter,
                links,
                coverage,
            }
            .or_all();
            let result = validator.run(checks)?;

            if json {
                println!("{}", report::render_check_json(&result)?);
                eprintln!("{}", report::render_summary(&result));
            } else {
                print!("{}", report::render_check_text(&result));
                println!("{}", report::render_summary(&result));
            }

            Ok(if result.is_failure(strict) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Coverage { json, top } => {
            let checks = Checks {
                coverage: true,
                ..Checks::default()
            };
            let result = validator.run(checks)?;
            let source_files = result.source_files;
            let coverage = result.coverage.unwrap_or_default();
            let now = chrono::Local::now();

            if json {
                println!(
                    "{}",
                    report::render_dashboard_json(&cfg, source_files, &coverage, now)?
                );
            } else {
                print!(
                    "{}",
                    report::render_dashboard_text(&cfg, source_files, &coverage, now, top)
                );
            }
            for finding in &result.findings {
                eprintln!("{}", finding);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
