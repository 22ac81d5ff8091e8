use crate::page_range::PageLimit;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "genslides")]
#[command(about = "Generate slide decks from text or PDF content with a language model")]
#[command(version)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// Text to summarize ("-" reads stdin)
    #[arg(long)]
    pub text: Option<String>,

    /// File containing text to summarize
    #[arg(long)]
    pub text_file: Option<PathBuf>,

    /// PDF to summarize
    #[arg(long)]
    pub pdf: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server over stdio
    Mcp,

    /// Generate a presentation from text or a PDF
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Main points or topics the presentation should cover
        #[arg(short, long, default_value = "")]
        agenda: String,

        /// Page ranges to read from the PDF (e.g. "2,3,5-8,9"; empty for all)
        #[arg(short, long, default_value = "")]
        pages: String,

        /// Model preset (gemini_flash_l, gemini_flash)
        #[arg(short, long)]
        model: Option<String>,

        /// Directory the presentation is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Maximum number of PDF pages to read
        #[arg(long)]
        max_pages: Option<PageLimit>,

        /// Also write the model's outline as JSON
        #[arg(long)]
        save_outline: Option<PathBuf>,
    },

    /// Show which pages a page range selects
    Pages {
        /// Page ranges (e.g. "2,3,5-8,9")
        expression: String,

        /// Maximum page number
        #[arg(long)]
        max_pages: Option<PageLimit>,

        /// Fail on an invalid range instead of selecting every page
        #[arg(long)]
        strict: bool,
    },

    /// Extract PDF pages as markdown
    Extract {
        /// PDF file to read
        path: PathBuf,

        /// Page ranges (e.g. "1-5,10"; empty for all)
        #[arg(short, long, default_value = "")]
        pages: String,

        /// Maximum number of pages to read
        #[arg(long)]
        max_pages: Option<PageLimit>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a saved outline (JSON) into a presentation
    Render {
        /// Outline JSON file
        outline: PathBuf,

        /// Directory the presentation is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_requires_one_input() {
        assert!(Cli::try_parse_from(["genslides", "generate"]).is_err());
        assert!(Cli::try_parse_from([
            "genslides", "generate", "--text", "a", "--pdf", "b.pdf"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["genslides", "generate", "--pdf", "b.pdf", "-p", "1-3"]).is_ok());
    }

    #[test]
    fn test_zero_max_pages_is_rejected() {
        assert!(Cli::try_parse_from(["genslides", "pages", "1-3", "--max-pages", "0"]).is_err());
        let cli = Cli::try_parse_from(["genslides", "pages", "1-3", "--max-pages", "5"]).unwrap();
        match cli.command {
            Commands::Pages { max_pages, .. } => assert_eq!(max_pages, PageLimit::new(5)),
            _ => panic!("expected pages command"),
        }
    }
}
