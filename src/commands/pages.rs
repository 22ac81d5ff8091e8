use crate::page_range::{self, PageLimit};
use anyhow::Result;

pub fn run(expression: &str, limit: PageLimit, strict: bool) -> Result<()> {
    let pages = if strict {
        page_range::parse(expression, limit)?
    } else {
        page_range::resolve(expression, limit)
    };

    println!("{}", pages);
    println!("\n{} page(s) of {}", pages.len(), limit);

    Ok(())
}
