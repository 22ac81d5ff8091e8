use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;
use crate::llm::{self, GeminiClient};
use crate::page_range::{self, PageLimit};
use crate::pipeline::{extract_pdf_markdown, Job, Source};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ResolvePagesRequest {
    #[schemars(description = "Page ranges (e.g., '2,3,5-8,9'); empty selects every page")]
    pub pages: String,
    #[schemars(description = "Highest selectable page, capped at the configured maximum (default: configured maximum)")]
    pub max_pages: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExtractMarkdownRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Page ranges (e.g., '1-5,10'); empty selects every page")]
    #[serde(default)]
    pub pages: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateSlidesRequest {
    #[schemars(description = "Text to summarize; ignored when pdf_path is set")]
    #[serde(default)]
    pub text: String,
    #[schemars(description = "Path to a PDF to summarize instead of text")]
    pub pdf_path: Option<String>,
    #[schemars(description = "Main points or topics the presentation should cover")]
    #[serde(default)]
    pub agenda: String,
    #[schemars(description = "Page ranges to read from the PDF (e.g., '2,3,5-8,9')")]
    #[serde(default)]
    pub pages: String,
    #[schemars(description = "Model preset (gemini_flash_l or gemini_flash)")]
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SlidesServer {
    config: Config,
    tool_router: ToolRouter<Self>,
}

impl SlidesServer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl SlidesServer {
    #[tool(description = "Resolve a page range expression into the sorted list of pages it selects. Invalid expressions select every page.")]
    fn resolve_pages(&self, Parameters(req): Parameters<ResolvePagesRequest>) -> String {
        // never above the configured maximum
        let limit = match req.max_pages {
            Some(n) => match PageLimit::new(n) {
                Some(limit) => limit.min(self.config.max_pages),
                None => return "Error: max_pages must be a positive integer".to_string(),
            },
            None => self.config.max_pages,
        };
        let strict = page_range::parse(&req.pages, limit);
        let pages = page_range::resolve(&req.pages, limit);
        let result = ResolvePagesResult {
            max_pages: limit.get(),
            fallback: strict.as_ref().map(|p| p != &pages).unwrap_or(true),
            diagnostic: strict.err().map(|e| e.to_string()),
            pages: pages.into_vec(),
        };
        serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
    }

    #[tool(description = "Extract text from pages of a PDF as markdown. Use page range syntax like '2,3,5-8,9'.")]
    fn extract_markdown(&self, Parameters(req): Parameters<ExtractMarkdownRequest>) -> String {
        match extract_pdf_markdown(req.path.as_ref(), &req.pages, &self.config) {
            Ok((pages, markdown)) => {
                let result = ExtractMarkdownResult {
                    pages: pages.into_vec(),
                    markdown,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Summarize text or a PDF into a PowerPoint presentation and return the saved file path")]
    async fn generate_slides(&self, Parameters(req): Parameters<GenerateSlidesRequest>) -> String {
        let source = match req.pdf_path {
            Some(path) => Source::Pdf(PathBuf::from(path)),
            None => Source::Text(req.text),
        };
        let job = Job {
            source,
            agenda: req.agenda,
            pages: req.pages,
        };

        let preset = llm::preset(req.model.as_deref().unwrap_or(&self.config.model));
        let model = match GeminiClient::new(
            self.config.api_key.as_deref(),
            &self.config.api_base_url,
            preset,
        ) {
            Ok(m) => m,
            Err(e) => return format!("Error: {}", e),
        };

        match job.run(&self.config, &model).await {
            Ok(generated) => {
                let result = GenerateSlidesResult {
                    path: generated.path.display().to_string(),
                    slide_count: generated.outline.slides.len() as u32 + 1,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ResolvePagesResult {
    pub pages: Vec<u32>,
    pub max_pages: u32,
    pub fallback: bool,
    pub diagnostic: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExtractMarkdownResult {
    pub pages: Vec<u32>,
    pub markdown: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GenerateSlidesResult {
    pub path: String,
    pub slide_count: u32,
}

#[tool_handler]
impl ServerHandler for SlidesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Slide generation tools. Use resolve_pages to check a page range, \
                 extract_markdown to read PDF pages as markdown, and generate_slides \
                 to summarize text or a PDF into a .pptx presentation."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let server = SlidesServer::new(config);
    tracing::info!("serving MCP over stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> SlidesServer {
        SlidesServer::new(Config::default())
    }

    #[test]
    fn test_resolve_pages_tool() {
        let out = server().resolve_pages(Parameters(ResolvePagesRequest {
            pages: "18-25".into(),
            max_pages: None,
        }));
        let result: ResolvePagesResult = serde_json::from_str(&out).unwrap();
        assert_eq!(result.pages, vec![18, 19, 20]);
        assert!(!result.fallback);
        assert_eq!(result.diagnostic, None);
    }

    #[test]
    fn test_resolve_pages_tool_reports_fallback() {
        let out = server().resolve_pages(Parameters(ResolvePagesRequest {
            pages: "2,abc".into(),
            max_pages: Some(3),
        }));
        let result: ResolvePagesResult = serde_json::from_str(&out).unwrap();
        assert_eq!(result.pages, vec![1, 2, 3]);
        assert!(result.fallback);
        assert!(result.diagnostic.unwrap().contains("abc"));
    }

    #[test]
    fn test_resolve_pages_tool_rejects_zero_limit() {
        let out = server().resolve_pages(Parameters(ResolvePagesRequest {
            pages: "1".into(),
            max_pages: Some(0),
        }));
        assert!(out.starts_with("Error:"));
    }

    #[test]
    fn test_resolve_pages_tool_caps_limit() {
        let out = server().resolve_pages(Parameters(ResolvePagesRequest {
            pages: String::new(),
            max_pages: Some(4_000_000_000),
        }));
        let result: ResolvePagesResult = serde_json::from_str(&out).unwrap();
        assert_eq!(result.max_pages, 20);
        assert_eq!(result.pages, (1..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_generate_without_api_key() {
        let out = server()
            .generate_slides(Parameters(GenerateSlidesRequest {
                text: "hello".into(),
                pdf_path: None,
                agenda: String::new(),
                pages: String::new(),
                model: None,
            }))
            .await;
        assert!(out.contains("GOOGLE_API_KEY"));
    }
}
