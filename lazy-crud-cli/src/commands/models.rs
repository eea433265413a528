//! `lazy models`: one Sea-ORM entity per table

use super::{database_url, load_config, print_outcomes};
use anyhow::{Context, Result};
use console::style;
use lazy_crud_cli::scaffold::{FileKind, ModelsOptions, ScaffoldGenerator, WriteOutcome};
use lazy_crud_cli::SchemaInspector;
use std::path::PathBuf;

pub struct ModelsCommand {
    pub options: ModelsOptions,
    pub force: bool,
    pub database_url: Option<String>,
    pub config: PathBuf,
}

impl ModelsCommand {
    pub async fn execute(&self) -> Result<()> {
        let config = load_config(&self.config)?;
        let url = database_url(self.database_url.as_deref(), &config)?;
        let inspector = SchemaInspector::connect(&url).await?;

        let project_root = std::env::current_dir().context("Failed to get current directory")?;
        let generator = ScaffoldGenerator::new(config.generator, project_root)
            .context("Failed to create model generator")?;

        println!("\n{}", style("Generating models...").cyan().bold());
        let files = generator.plan_models(&inspector, &self.options).await?;
        let outcomes = generator.write(&files, self.force)?;

        let written = outcomes
            .iter()
            .filter(|o| matches!(o, WriteOutcome::Written(_)))
            .count();
        println!("\n{} {written} files:", style("Generated").green().bold());
        print_outcomes(&files, &outcomes);

        let count = files.iter().filter(|f| f.kind == FileKind::Model).count();
        println!(
            "\n{} {} models are ready!",
            style("✨").green().bold(),
            style(count).green().bold()
        );
        Ok(())
    }
}
