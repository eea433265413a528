//! CLI command implementations

pub mod models;
pub mod publish;
pub mod suite;

pub use models::ModelsCommand;
pub use publish::PublishCommand;
pub use suite::SuiteCommand;

use anyhow::{anyhow, Context, Result};
use console::style;
use lazy_crud::config::LazyConfig;
use lazy_crud_cli::scaffold::{GeneratedFile, WriteOutcome};
use std::path::Path;

fn load_config(path: &Path) -> Result<LazyConfig> {
    LazyConfig::load_from(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// The URL given on the command line wins over `database.url`
fn database_url(flag: Option<&str>, config: &LazyConfig) -> Result<String> {
    flag.map(str::to_string)
        .or_else(|| config.database.url.clone())
        .ok_or_else(|| {
            anyhow!("No database configured. Pass --database-url, set DATABASE_URL or database.url in the config file")
        })
}

fn print_outcomes(files: &[GeneratedFile], outcomes: &[WriteOutcome]) {
    for (file, outcome) in files.iter().zip(outcomes) {
        match outcome {
            WriteOutcome::Written(path) => println!(
                "  {} {} ({})",
                style("✓").green(),
                style(path.display()).dim(),
                style(file.kind.description()).dim()
            ),
            WriteOutcome::Skipped(path) => println!(
                "  {} {} {}",
                style("-").yellow(),
                style(path.display()).dim(),
                style("exists, use --force to overwrite").yellow()
            ),
        }
    }
}
