//! CLI interface for recommit.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod authors;
mod rewrite;

pub use authors::AuthorsCommand;
pub use rewrite::{OutputFormat, RewriteCommand};

/// recommit: rewrites a branch's history with reassigned authorship.
#[derive(Parser)]
#[command(name = "recommit")]
#[command(about = "Rewrites a branch's history with reassigned authorship", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Rewrites a branch onto recommited/<branch>.
    Rewrite(RewriteCommand),
    /// Shows the author pool that would be used.
    Authors(AuthorsCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Rewrite(rewrite_cmd) => rewrite_cmd.execute(),
            Commands::Authors(authors_cmd) => authors_cmd.execute(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rewrite_defaults() {
        let cli = Cli::try_parse_from(["recommit", "rewrite"]).unwrap();
        let Commands::Rewrite(cmd) = cli.command else {
            panic!("expected rewrite command");
        };
        assert_eq!(cmd.repo, std::path::PathBuf::from("."));
        assert_eq!(cmd.branch, "master");
        assert!(!cmd.change_time);
        assert!(!cmd.keep_author);
        assert_eq!(cmd.format, OutputFormat::Text);
    }

    #[test]
    fn parses_rewrite_flags() {
        let cli = Cli::try_parse_from([
            "recommit",
            "rewrite",
            "/tmp/repo",
            "--branch",
            "main",
            "--change-time",
            "--keep-author",
            "--marker",
            "ACME",
            "--replacement",
            "Initech",
            "--format",
            "yaml",
        ])
        .unwrap();
        let Commands::Rewrite(cmd) = cli.command else {
            panic!("expected rewrite command");
        };
        assert_eq!(cmd.repo, std::path::PathBuf::from("/tmp/repo"));
        assert_eq!(cmd.branch, "main");
        assert!(cmd.change_time);
        assert!(cmd.keep_author);
        assert_eq!(cmd.marker.as_deref(), Some("ACME"));
        assert_eq!(cmd.format, OutputFormat::Yaml);
    }

    #[test]
    fn rewrite_has_no_dirty_override() {
        assert!(Cli::try_parse_from(["recommit", "rewrite", "--allow-dirty"]).is_err());
    }
}
