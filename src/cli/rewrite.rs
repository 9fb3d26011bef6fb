//! Rewrite command — rebuilds a branch's history with reassigned authorship.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::warn;

use crate::data::{AuthorPool, MessageSubstitution};
use crate::error::RewriteError;
use crate::git::GitRepository;
use crate::rewrite::{HistoryRewriter, MetadataOptions, RandomPicker, RewriteOptions, RewriteReport};
use crate::utils::{author_pool_path, Settings};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Text,
    /// YAML document.
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

/// Rewrite command options.
#[derive(Parser)]
pub struct RewriteCommand {
    /// Repository to rewrite.
    #[arg(value_name = "REPO", default_value = ".")]
    pub repo: PathBuf,

    /// Source branch; falls back to origin/<BRANCH> when no local branch exists.
    #[arg(long, default_value = "master")]
    pub branch: String,

    /// Shifts author and committer times six calendar months forward.
    #[arg(long)]
    pub change_time: bool,

    /// Keeps the original signatures, rewriting only the commit chain.
    #[arg(long)]
    pub keep_author: bool,

    /// Author pool YAML file (default: $RECOMMIT_AUTHORS or ~/.recommit/authors.yaml).
    #[arg(long, value_name = "FILE")]
    pub authors: Option<PathBuf>,

    /// Token to replace in rewritten commit messages.
    #[arg(long, requires = "replacement")]
    pub marker: Option<String>,

    /// Replacement for every occurrence of the marker.
    #[arg(long, requires = "marker")]
    pub replacement: Option<String>,

    /// Report output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl RewriteCommand {
    /// Executes the rewrite command.
    pub fn execute(self) -> Result<()> {
        let pool = self.load_pool()?;

        let mut repo = GitRepository::open_at(&self.repo).with_context(|| {
            format!("Failed to open git repository at {}", self.repo.display())
        })?;

        let options = RewriteOptions {
            metadata: MetadataOptions {
                change_time: self.change_time,
                keep_author: self.keep_author,
            },
        };

        println!("🔄 Rewriting history of {}", self.branch);
        let mut picker = RandomPicker;
        let result =
            HistoryRewriter::new(&mut repo, &pool, &mut picker, options).run(&self.branch);

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(RewriteError::WorkingDirectoryDirty) => {
                if let Ok(status) = repo.get_working_directory_status() {
                    println!("Working directory has uncommitted changes:");
                    for change in &status.changes {
                        println!("  {} {}", change.status, change.file);
                    }
                }
                return Err(RewriteError::WorkingDirectoryDirty.into());
            }
            Err(err) => return Err(err).context("History rewrite failed"),
        };

        match RewriteReport::summarize(&outcome.branch, &outcome.records, &outcome.failures) {
            Ok(report) => self.print_report(&report)?,
            Err(err) => {
                warn!("Failed to summarize rewrite: {err}");
                println!("⚠️  Could not summarize rewrite of {}: {err}", outcome.branch);
                println!("Rewritten branch: {}", outcome.branch);
                println!("Modified commits: {}", outcome.records.len());
            }
        }

        Ok(())
    }

    /// Loads the author pool and applies message substitution overrides.
    fn load_pool(&self) -> Result<AuthorPool> {
        let settings = Settings::load().unwrap_or_else(|err| {
            warn!("Ignoring unreadable settings: {err:#}");
            Settings::default()
        });
        let path = author_pool_path(self.authors.as_deref(), &settings)?;

        let mut pool = AuthorPool::load_from_file(&path)
            .with_context(|| format!("Failed to load author pool from {}", path.display()))?;

        if let (Some(marker), Some(replacement)) = (&self.marker, &self.replacement) {
            pool.message = MessageSubstitution::new(marker.as_str(), replacement.as_str());
        }

        Ok(pool)
    }

    fn print_report(&self, report: &RewriteReport) -> Result<()> {
        match self.format {
            OutputFormat::Text => print!("{}", report.to_text()),
            OutputFormat::Yaml => print!("{}", crate::data::to_yaml(report)?),
            OutputFormat::Json => println!("{}", crate::data::to_json(report)?),
        }
        Ok(())
    }
}
