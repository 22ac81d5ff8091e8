use crate::config::Config;
use crate::pipeline::extract_pdf_markdown;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P, pages: &str, config: &Config, output: Option<&Path>) -> Result<()> {
    let (page_set, markdown) = extract_pdf_markdown(path.as_ref(), pages, config)?;

    match output {
        Some(output) => {
            std::fs::write(output, &markdown)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "Extracted {} page(s) ({}) to {}",
                page_set.len(),
                page_set,
                output.display()
            );
        }
        None => println!("{}", markdown),
    }

    Ok(())
}
