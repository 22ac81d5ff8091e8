use crate::deck::SlideDeck;
use crate::outline::Outline;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(outline: P, output_dir: Q) -> Result<()> {
    let outline = Outline::load(outline)?;
    let slides = outline.slides.len() + 1;
    let path = SlideDeck::new(output_dir).create_presentation(&outline)?;

    println!("Rendered {} slide(s) to {}", slides, path.display());

    Ok(())
}
