//! Command-line interface definitions for Relevant News.
//!
//! The three request fields mirror the search form: `q`, `from_date` and
//! `to_date`, where an empty date string means "no bound". Secrets and paths
//! can also be provided via environment variables.

use crate::models::SearchForm;
use crate::planner::FallbackPolicy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How the relevant articles are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// A JSON array of article objects.
    #[default]
    Json,
    /// A Markdown list of linked headlines.
    Markdown,
}

/// Command-line arguments for the Relevant News application.
///
/// # Examples
///
/// ```sh
/// # Term only
/// relevant_news --q climate
///
/// # With a date window, rendered as Markdown into a file
/// relevant_news --q climate --from-date 2025-05-01 --to-date 2025-05-06 \
///     --format markdown --output ./out/climate.md
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search term
    #[arg(long)]
    pub q: String,

    /// Earliest publication date (YYYY-MM-DD); empty means no bound
    #[arg(long, default_value = "")]
    pub from_date: String,

    /// Latest publication date (YYYY-MM-DD); empty means no bound
    #[arg(long, default_value = "")]
    pub to_date: String,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// News provider API key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path to the relevance model artifact
    #[arg(long, env = "RELEVANT_NEWS_MODEL")]
    pub model_path: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Keep the `label` field on each returned article
    #[arg(long)]
    pub keep_label: bool,

    /// Which failures of a date-bounded search fall back to a term-only search
    #[arg(long, value_enum)]
    pub fallback: Option<FallbackPolicy>,
}

impl Cli {
    /// The request fields as a search form.
    pub fn search_form(&self) -> SearchForm {
        SearchForm {
            q: self.q.clone(),
            from_date: self.from_date.clone(),
            to_date: self.to_date.clone(),
        }
    }
}
