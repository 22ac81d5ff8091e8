use crate::config::Config;
use crate::deck::SlideDeck;
use crate::llm::LanguageModel;
use crate::outline::Outline;
use crate::page_range::{self, PageSet};
use crate::pdf::{self, PdfDocument};
use crate::prompt::{build_slide_prompt, truncate_chars};
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Source {
    Text(String),
    Pdf(PathBuf),
}

/// One deck generation request.
#[derive(Debug, Clone)]
pub struct Job {
    pub source: Source,
    pub agenda: String,
    /// Page range expression, only used for PDF sources.
    pub pages: String,
}

#[derive(Debug)]
pub struct Generated {
    pub path: PathBuf,
    pub outline: Outline,
}

/// Resolve `expression` against a PDF and extract those pages as markdown.
pub fn extract_pdf_markdown(
    path: &std::path::Path,
    expression: &str,
    config: &Config,
) -> Result<(PageSet, String)> {
    let doc = PdfDocument::open(path)?;
    let limit = doc.page_limit(config.max_pages)?;
    let pages = page_range::resolve(expression, limit);
    tracing::info!(
        path = %path.display(),
        total = doc.page_count(),
        pages = %pages,
        "extracting {} pages",
        pages.len()
    );
    let markdown = pdf::text::extract_markdown(path, &pages)?;
    Ok((pages, markdown))
}

impl Job {
    /// The text to summarize: truncated input text, or extracted PDF markdown.
    pub fn content(&self, config: &Config) -> Result<String> {
        let content = match &self.source {
            Source::Text(text) => {
                let text = text.trim();
                let truncated = truncate_chars(text, config.max_chars());
                if truncated.len() < text.len() {
                    tracing::warn!(
                        max_chars = config.max_chars(),
                        "input text truncated"
                    );
                }
                truncated.to_string()
            }
            Source::Pdf(path) => extract_pdf_markdown(path, &self.pages, config)?.1,
        };
        if content.trim().is_empty() {
            anyhow::bail!("No content to summarize");
        }
        Ok(content)
    }

    /// Ask the model for an outline of this job's content.
    pub async fn outline(&self, config: &Config, model: &dyn LanguageModel) -> Result<Outline> {
        let content = self.content(config)?;
        let prompt = build_slide_prompt(&self.agenda, &content);
        tracing::debug!(model = model.name(), prompt_chars = prompt.len(), "requesting outline");

        let completion = model
            .complete(&prompt)
            .await
            .with_context(|| format!("Model {} failed", model.name()))?;
        let outline = Outline::from_response(&completion.text)?;
        tracing::info!(slides = outline.slides.len() + 1, "received outline");
        Ok(outline)
    }

    pub async fn run(&self, config: &Config, model: &dyn LanguageModel) -> Result<Generated> {
        let outline = self.outline(config, model).await?;
        let path = SlideDeck::new(&config.output_dir).create_presentation(&outline)?;
        Ok(Generated { path, outline })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Completion, LlmError};
    use crate::page_range::PageLimit;
    use crate::pdf::test_support::write_text_pdf;
    use crate::pdf::text::PAGE_SEPARATOR;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeModel {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeModel {
        fn new(reply: &str) -> Self {
            FakeModel {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for FakeModel {
        fn name(&self) -> &str {
            "fake"
        }

        async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(Completion {
                text: self.reply.clone(),
                usage: None,
            })
        }
    }

    struct BrokenModel;

    #[async_trait]
    impl LanguageModel for BrokenModel {
        fn name(&self) -> &str {
            "broken"
        }

        async fn complete(&self, _prompt: &str) -> Result<Completion, LlmError> {
            Err(LlmError::Api {
                status: 400,
                body: "bad request".into(),
            })
        }
    }

    fn config(dir: &std::path::Path) -> Config {
        Config {
            max_pages: PageLimit::new(1).unwrap(),
            output_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    fn text_job(text: &str) -> Job {
        Job {
            source: Source::Text(text.to_string()),
            agenda: "Results".into(),
            pages: String::new(),
        }
    }

    fn write_notes(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("notes.pdf");
        write_text_pdf(&path, &["alpha", "bravo", "charlie"]);
        path
    }

    #[test]
    fn test_pdf_pages_resolve_against_document_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_notes(dir.path());
        let config = Config {
            output_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        let (pages, markdown) = extract_pdf_markdown(&path, "", &config).unwrap();
        assert_eq!(pages.into_vec(), vec![1, 2, 3]);
        assert!(markdown.contains("alpha"));
        assert!(markdown.contains("charlie"));

        let (pages, markdown) = extract_pdf_markdown(&path, "2-9", &config).unwrap();
        assert_eq!(pages.into_vec(), vec![2, 3]);
        assert!(!markdown.contains("alpha"));
        assert!(markdown.contains("bravo"));
        assert!(markdown.contains(PAGE_SEPARATOR));

        // past the end of a 3 page document
        let (pages, _) = extract_pdf_markdown(&path, "7", &config).unwrap();
        assert_eq!(pages.into_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_pdf_pages_respect_configured_maximum() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_notes(dir.path());
        let config = Config {
            max_pages: PageLimit::new(2).unwrap(),
            ..Config::default()
        };
        let (pages, markdown) = extract_pdf_markdown(&path, "", &config).unwrap();
        assert_eq!(pages.into_vec(), vec![1, 2]);
        assert!(!markdown.contains("charlie"));
    }

    #[tokio::test]
    async fn test_pdf_job_prompts_with_selected_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_notes(dir.path());
        let config = Config {
            output_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let model = FakeModel::new(r#"[{"title_text": "Field Notes"}]"#);
        let job = Job {
            source: Source::Pdf(path),
            agenda: "Summary".into(),
            pages: "3".into(),
        };

        let generated = job.run(&config, &model).await.unwrap();
        assert_eq!(generated.path, dir.path().join("field-notes.pptx"));

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Agenda: Summary\nContent: "));
        assert!(prompts[0].contains("charlie"));
        assert!(!prompts[0].contains("alpha"));
        assert!(!prompts[0].contains("bravo"));
    }

    #[tokio::test]
    async fn test_text_job_writes_deck() {
        let dir = tempfile::tempdir().unwrap();
        let model = FakeModel::new(
            "```json\n[{\"title_text\": \"Q3 Results\"}, {\"title_text\": \"Sales\", \"text\": [\"Up 5%\"]}]\n```",
        );

        let generated = text_job("Sales went up five percent.")
            .run(&config(dir.path()), &model)
            .await
            .unwrap();

        assert_eq!(generated.path, dir.path().join("q3-results.pptx"));
        assert!(generated.path.exists());
        assert_eq!(generated.outline.slides.len(), 1);

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].ends_with("Agenda: Results\nContent: Sales went up five percent."));
    }

    #[test]
    fn test_text_is_truncated_to_budget() {
        let dir = tempfile::tempdir().unwrap();
        let long = "a".repeat(5000);
        let content = text_job(&long).content(&config(dir.path())).unwrap();
        assert_eq!(content.len(), 2000);
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let model = FakeModel::new("[]");
        let err = text_job("   ").run(&config(dir.path()), &model).await.unwrap_err();
        assert!(err.to_string().contains("No content"));
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let err = text_job("hello")
            .run(&config(dir.path()), &BrokenModel)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("400"));
    }

    #[tokio::test]
    async fn test_invalid_outline_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let model = FakeModel::new("I cannot help with that.");
        let err = text_job("hello")
            .run(&config(dir.path()), &model)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid model response"));
    }
}
