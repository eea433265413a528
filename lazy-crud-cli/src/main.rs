//! lazy CLI tool

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{ModelsCommand, PublishCommand, SuiteCommand};
use lazy_crud::config::CONFIG_FILE;
use lazy_crud_cli::scaffold::{ModelsOptions, SuiteOptions};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "lazy")]
#[command(version)]
#[command(about = "Generate lazy-crud suites from an existing database", long_about = None)]
struct Cli {
    /// Log what the generator does
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate model, controller, requests and views for one table
    #[command(alias = "make")]
    Suite {
        /// Suite name (`post`, `UserProfile`)
        name: String,
        /// Table to use instead of the plural of the name
        #[arg(short, long)]
        table: Option<String>,
        /// Model name to use instead of the singular of the name
        #[arg(short, long)]
        model: Option<String>,
        /// Do not generate the model
        #[arg(long)]
        without_model: bool,
        /// Do not generate the request validators
        #[arg(long)]
        without_requests: bool,
        /// Do not generate the views
        #[arg(long)]
        without_views: bool,
        /// Views root directory
        #[arg(long)]
        view_path: Option<PathBuf>,
        /// Skip the confirmation
        #[arg(short = 'y', long)]
        yes: bool,
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
        /// Database to read the table from
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
    /// Generate a model for every table
    Models {
        /// Only these models or tables (comma separated)
        #[arg(long, value_delimiter = ',')]
        model: Vec<String>,
        /// Skip these models or tables (comma separated)
        #[arg(long, value_delimiter = ',')]
        without_model: Vec<String>,
        /// Output directory
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
        /// Database to read the tables from
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
    /// Write the default configuration file
    Publish {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug,sqlx=warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .ok();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Suite {
            name,
            table,
            model,
            without_model,
            without_requests,
            without_views,
            view_path,
            yes,
            force,
            database_url,
        } => {
            let cmd = SuiteCommand {
                options: SuiteOptions {
                    name,
                    table,
                    model,
                    without_model,
                    without_requests,
                    without_views,
                    view_path,
                },
                yes,
                force,
                database_url,
                config: cli.config,
            };
            cmd.execute().await?;
        }
        Commands::Models {
            model,
            without_model,
            path,
            force,
            database_url,
        } => {
            let cmd = ModelsCommand {
                options: ModelsOptions {
                    only: model,
                    without: without_model,
                    path,
                },
                force,
                database_url,
                config: cli.config,
            };
            cmd.execute().await?;
        }
        Commands::Publish { force } => {
            PublishCommand {
                path: cli.config,
                force,
            }
            .execute()?;
        }
    }

    Ok(())
}
