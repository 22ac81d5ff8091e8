use crate::cli::InputArgs;
use crate::config::Config;
use crate::llm::{self, GeminiClient};
use crate::pipeline::{Job, Source};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

pub fn read_source(input: &InputArgs) -> Result<Source> {
    if let Some(path) = &input.pdf {
        return Ok(Source::Pdf(path.clone()));
    }
    if let Some(path) = &input.text_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(Source::Text(text));
    }
    match input.text.as_deref() {
        Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(Source::Text(text))
        }
        Some(text) => Ok(Source::Text(text.to_string())),
        None => anyhow::bail!("Please provide either text content or a PDF file"),
    }
}

pub async fn run(job: &Job, config: &Config, save_outline: Option<&Path>) -> Result<()> {
    let preset = llm::preset(&config.model);
    let model = GeminiClient::new(config.api_key.as_deref(), &config.api_base_url, preset)?;

    let generated = job
        .run(config, &model)
        .await
        .context("Error in generating slides")?;

    if let Some(path) = save_outline {
        generated.outline.save(path)?;
        println!("Outline saved to {}", path.display());
    }
    println!(
        "Slides generated successfully! File: {}",
        generated.path.display()
    );

    Ok(())
}
