//! `lazy suite`: model, controller, requests and views of one table
//!
//! ```bash
//! lazy suite post
//! lazy suite UserProfile --table profiles --without-views
//! ```

use super::{database_url, load_config, print_outcomes};
use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;
use lazy_crud_cli::scaffold::{FileKind, ScaffoldGenerator, SuiteOptions, SuitePlan, WriteOutcome};
use lazy_crud_cli::SchemaInspector;
use std::path::PathBuf;

pub struct SuiteCommand {
    pub options: SuiteOptions,
    pub yes: bool,
    pub force: bool,
    pub database_url: Option<String>,
    pub config: PathBuf,
}

impl SuiteCommand {
    pub async fn execute(&self) -> Result<()> {
        let config = load_config(&self.config)?;
        let url = database_url(self.database_url.as_deref(), &config)?;
        let inspector = SchemaInspector::connect(&url).await?;

        let project_root = std::env::current_dir().context("Failed to get current directory")?;
        let generator = ScaffoldGenerator::new(config.generator, project_root)
            .context("Failed to create scaffold generator")?;

        let plan = generator.plan_suite(&inspector, &self.options).await?;
        print_plan(&plan);

        if !self.yes
            && !Confirm::new()
                .with_prompt("Confirm?")
                .default(true)
                .interact()
                .context("Failed to read confirmation")?
        {
            println!("OK.");
            return Ok(());
        }

        let outcomes = generator.write(&plan.files, self.force)?;
        println!(
            "\n{} {} files:",
            style("Generated").green().bold(),
            outcomes
                .iter()
                .filter(|o| matches!(o, WriteOutcome::Written(_)))
                .count()
        );
        print_outcomes(&plan.files, &outcomes);

        println!(
            "\n{} Suite for {} is ready!",
            style("✨").green().bold(),
            style(&plan.names.model).green().bold()
        );

        let snake = &plan.names.model_snake;
        println!("\n{}", style("Next steps:").cyan().bold());
        let mut step = 1;
        if plan.files_of(FileKind::Model).next().is_some() {
            println!("  {step}. Add the model module: {}", style(format!("pub mod {snake};")).yellow());
            step += 1;
        }
        if plan.files_of(FileKind::Request).next().is_some() {
            println!("  {step}. Add the requests module: {}", style(format!("pub mod {snake};")).yellow());
            step += 1;
        }
        println!(
            "  {step}. Add the controller module: {}",
            style(format!("pub mod {snake}_controller;")).yellow()
        );
        println!(
            "  {}. Register it: {}",
            step + 1,
            style(format!(
                "LazyServiceProvider::new(db, config)?.resource::<{snake}_controller::{}Controller>()",
                plan.names.model
            ))
            .yellow()
        );

        Ok(())
    }
}

fn print_plan(plan: &SuitePlan) {
    println!(
        "\n{} {} using table `{}` with:",
        style("You'll build a suite for").cyan().bold(),
        style(&plan.names.model).green().bold(),
        style(&plan.table).green()
    );

    for kind in [FileKind::Model, FileKind::Controller, FileKind::Request, FileKind::View] {
        for file in plan.files_of(kind) {
            println!("  {} {}", style(kind.description()).dim(), file.path.display());
        }
    }

    if !plan.relations.is_empty() {
        println!("\n{}", style("Relations:").cyan());
        for relation in &plan.relations {
            println!("  {relation}");
        }
    }
    println!();
}
