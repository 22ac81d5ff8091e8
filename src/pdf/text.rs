use crate::page_range::PageSet;
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Rule placed between pages in extracted markdown.
pub const PAGE_SEPARATOR: &str = "\n\n-----\n\n";

#[derive(Debug, Clone)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

/// Extract text from the given pages of a PDF, one entry per page in set order.
pub fn extract_text_pages<P: AsRef<Path>>(path: P, pages: &PageSet) -> Result<Vec<PageText>> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read PDF: {}", path.display()))?;

    let total_pages = PdfDocument::load_mem(&bytes, path)?.page_count();
    if pages.last() > total_pages {
        anyhow::bail!("Page {} is out of range (1-{})", pages.last(), total_pages);
    }

    let all_pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        extracted = all_pages.len(),
        requested = pages.len(),
        "extracted page text"
    );
    Ok(select_pages(path, &all_pages, pages))
}

/// Pick the requested pages out of a whole-document extraction. Pages the
/// extractor did not return come back empty, with a warning.
fn select_pages(path: &Path, all_pages: &[String], pages: &PageSet) -> Vec<PageText> {
    let missing: Vec<u32> = pages
        .iter()
        .filter(|&page| page as usize > all_pages.len())
        .collect();
    if !missing.is_empty() {
        tracing::warn!(
            path = %path.display(),
            extracted = all_pages.len(),
            ?missing,
            "text extraction returned fewer pages than the document has"
        );
    }

    pages
        .iter()
        .map(|page| PageText {
            page,
            text: all_pages
                .get((page - 1) as usize)
                .cloned()
                .unwrap_or_default(),
        })
        .collect()
}

/// Extract the given pages as markdown, pages separated by a horizontal rule.
pub fn extract_markdown<P: AsRef<Path>>(path: P, pages: &PageSet) -> Result<String> {
    let texts = extract_text_pages(path, pages)?;
    Ok(pages_to_markdown(&texts))
}

pub fn pages_to_markdown(pages: &[PageText]) -> String {
    pages
        .iter()
        .filter_map(|p| {
            let text = tidy_text(&p.text);
            if text.is_empty() {
                tracing::debug!(page = p.page, "no text on page");
                None
            } else {
                Some(text)
            }
        })
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

/// Normalize raw extracted text: unix line endings, no trailing blanks, words
/// split across lines by a hyphen rejoined, at most one blank line in a row.
pub fn tidy_text(raw: &str) -> String {
    static TRAILING: OnceLock<Regex> = OnceLock::new();
    static HYPHENATED: OnceLock<Regex> = OnceLock::new();
    static BLANK_RUNS: OnceLock<Regex> = OnceLock::new();

    let trailing = TRAILING.get_or_init(|| Regex::new(r"[ \t]+\n").unwrap());
    let hyphenated = HYPHENATED.get_or_init(|| Regex::new(r"(\p{L})-\n(\p{Ll})").unwrap());
    let blank_runs = BLANK_RUNS.get_or_init(|| Regex::new(r"\n{3,}").unwrap());

    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = trailing.replace_all(&text, "\n");
    let text = hyphenated.replace_all(&text, "$1$2");
    let text = blank_runs.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_range::{resolve, PageLimit};
    use crate::pdf::test_support::write_blank_pdf;

    #[test]
    fn test_tidy_text() {
        let raw = "  Intro  \r\n\r\n\r\n\r\nThe pre-\nsentation covers   \nrevenue.\n\n\n";
        assert_eq!(tidy_text(raw), "Intro\n\nThe presentation covers\nrevenue.");
    }

    #[test]
    fn test_tidy_keeps_real_hyphens() {
        assert_eq!(tidy_text("2021-\n2022"), "2021-\n2022");
        assert_eq!(tidy_text("Rust-\nBased"), "Rust-\nBased");
    }

    #[test]
    fn test_pages_to_markdown_skips_empty_pages() {
        let pages = vec![
            PageText { page: 1, text: "First".into() },
            PageText { page: 2, text: "  \n ".into() },
            PageText { page: 3, text: "Third".into() },
        ];
        assert_eq!(pages_to_markdown(&pages), "First\n\n-----\n\nThird");
    }

    #[test]
    fn test_select_pages_fills_missing_with_empty_text() {
        let all_pages = vec!["one".to_string(), "two".to_string()];
        let pages = resolve("2-3", PageLimit::new(3).unwrap());
        let selected = select_pages(Path::new("short.pdf"), &all_pages, &pages);
        assert_eq!(selected.len(), 2);
        assert_eq!((selected[0].page, selected[0].text.as_str()), (2, "two"));
        assert_eq!((selected[1].page, selected[1].text.as_str()), (3, ""));
    }

    #[test]
    fn test_page_past_document_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.pdf");
        write_blank_pdf(&path, 2);

        let pages = resolve("1-3", PageLimit::new(3).unwrap());
        let err = extract_text_pages(&path, &pages).unwrap_err();
        assert!(err.to_string().contains("out of range (1-2)"));
    }
}
