//! `lazy publish`: write the default configuration file

use anyhow::{Context, Result};
use console::style;
use lazy_crud::config::publish_config;
use std::path::PathBuf;

pub struct PublishCommand {
    pub path: PathBuf,
    pub force: bool,
}

impl PublishCommand {
    pub fn execute(&self) -> Result<()> {
        let written = publish_config(&self.path, self.force)
            .with_context(|| format!("Failed to publish {}", self.path.display()))?;

        if written {
            println!(
                "{} Published {}",
                style("✓").green(),
                style(self.path.display()).green().bold()
            );
        } else {
            println!(
                "{} {} already exists, use --force to overwrite",
                style("-").yellow(),
                style(self.path.display()).dim()
            );
        }
        Ok(())
    }
}
