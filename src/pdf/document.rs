use crate::page_range::PageLimit;
use anyhow::{Context, Result};
use lopdf::Document;
use std::path::Path;

pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc =
            Document::load(&path).with_context(|| format!("Failed to open PDF: {}", path_str))?;
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    pub fn load_mem(bytes: &[u8], path: &Path) -> Result<Self> {
        let path_str = path.display().to_string();
        let doc = Document::load_mem(bytes)
            .with_context(|| format!("Failed to parse PDF: {}", path_str))?;
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// The bound page ranges for this document resolve against: the smaller
    /// of its length and the configured ceiling.
    pub fn page_limit(&self, max_pages: PageLimit) -> Result<PageLimit> {
        max_pages
            .clamp_to(self.page_count())
            .with_context(|| format!("PDF has no pages: {}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::write_blank_pdf;

    #[test]
    fn test_page_count_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.pdf");
        write_blank_pdf(&path, 3);

        let doc = PdfDocument::open(&path).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.page_limit(PageLimit::DEFAULT).unwrap().get(), 3);
        assert_eq!(
            doc.page_limit(PageLimit::new(2).unwrap()).unwrap().get(),
            2
        );
    }

    #[test]
    fn test_open_missing_file() {
        let err = PdfDocument::open("/nonexistent/file.pdf").err().unwrap();
        assert!(err.to_string().contains("Failed to open PDF"));
    }
}
