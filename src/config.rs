use crate::llm::gemini::GEMINI_API_BASE_URL;
use crate::page_range::PageLimit;
use std::path::PathBuf;
use thiserror::Error;

/// Characters of source text budgeted per page.
pub const CHARS_PER_PAGE: usize = 2000;

pub const DEFAULT_MODEL: &str = "gemini_flash_l";
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env`) then overridden
/// by command-line flags.
#[derive(Debug, Clone)]
pub struct Config {
    pub max_pages: PageLimit,
    pub model: String,
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_pages: PageLimit::DEFAULT,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base_url: GEMINI_API_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = lookup("GENSLIDES_MAX_PAGES") {
            config.max_pages = value.parse().map_err(|_| ConfigError::InvalidNumber {
                var: "GENSLIDES_MAX_PAGES",
                value,
            })?;
        }
        if let Some(model) = lookup("GENSLIDES_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        config.api_key = lookup("GOOGLE_API_KEY").filter(|k| !k.trim().is_empty());
        if let Some(base) = lookup("GENSLIDES_API_BASE").filter(|b| !b.trim().is_empty()) {
            config.api_base_url = base.trim().trim_end_matches('/').to_string();
        }
        if let Some(dir) = lookup("GENSLIDES_OUTPUT_DIR").filter(|d| !d.trim().is_empty()) {
            config.output_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Ceiling on free-text input, scaled with the page ceiling.
    pub fn max_chars(&self) -> usize {
        self.max_pages.get() as usize * CHARS_PER_PAGE
    }
}
