mod cli;
mod commands;
mod config;
mod deck;
mod llm;
mod mcp;
mod outline;
mod page_range;
mod pdf;
mod pipeline;
mod prompt;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(verbose: bool) {
    let default = if verbose { "genslides=debug" } else { "genslides=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    dotenvy::dotenv().ok();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Mcp => {
            mcp::run_server(config).await?;
        }
        Commands::Generate {
            input,
            agenda,
            pages,
            model,
            output_dir,
            max_pages,
            save_outline,
        } => {
            if let Some(model) = model {
                config.model = model;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(limit) = max_pages {
                config.max_pages = limit;
            }
            let job = pipeline::Job {
                source: commands::generate::read_source(&input)?,
                agenda,
                pages,
            };
            commands::generate::run(&job, &config, save_outline.as_deref()).await?;
        }
        Commands::Pages {
            expression,
            max_pages,
            strict,
        } => {
            commands::pages::run(&expression, max_pages.unwrap_or(config.max_pages), strict)?;
        }
        Commands::Extract {
            path,
            pages,
            max_pages,
            output,
        } => {
            if let Some(limit) = max_pages {
                config.max_pages = limit;
            }
            commands::extract::run(&path, &pages, &config, output.as_deref())?;
        }
        Commands::Render { outline, output_dir } => {
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            commands::render::run(&outline, &output_dir)?;
        }
    }

    Ok(())
}
