//! Authors command — shows the author pool a rewrite would draw from.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::data::{AuthorPool, Role};
use crate::utils::{author_pool_path, Settings};

/// Authors command options.
#[derive(Parser)]
pub struct AuthorsCommand {
    /// Author pool YAML file (default: $RECOMMIT_AUTHORS or ~/.recommit/authors.yaml).
    #[arg(long, value_name = "FILE")]
    pub authors: Option<PathBuf>,
}

impl AuthorsCommand {
    /// Executes the authors command.
    pub fn execute(self) -> Result<()> {
        let settings = Settings::load()?;
        let path = author_pool_path(self.authors.as_deref(), &settings)?;
        let pool = AuthorPool::load_from_file(&path)
            .with_context(|| format!("Failed to load author pool from {}", path.display()))?;

        println!("Author pool: {}", path.display());
        print!("{}", describe_pool(&pool));
        Ok(())
    }
}

/// Formats the pool grouped by role, with labels and message substitution.
fn describe_pool(pool: &AuthorPool) -> String {
    let mut out = String::new();
    for (role, label) in [
        (Role::Backend, &pool.labels.backend),
        (Role::Frontend, &pool.labels.frontend),
    ] {
        let authors = pool.with_role(role);
        out.push_str(&format!("{role} (paths containing \"{label}\"): {}\n", authors.len()));
        for entry in authors {
            out.push_str(&format!("  {}\n", entry.identity));
        }
    }
    if !pool.message.marker.is_empty() {
        out.push_str(&format!(
            "Message substitution: {} -> {}\n",
            pool.message.marker, pool.message.replacement
        ));
    }
    out
}
