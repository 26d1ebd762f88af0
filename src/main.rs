//! # Relevant News
//!
//! Searches a news provider for a term and optional date range, classifies each
//! article title with a pre-trained relevance model, and prints only the
//! relevant articles.
//!
//! ## Usage
//!
//! ```sh
//! NEWSAPI_KEY=... relevant_news --q climate --from-date 2025-05-01
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Startup**: Load config and the relevance model (fatal on failure)
//! 2. **Planning**: Pick the most specific search and fall back to a term-only
//!    search if the provider refuses the dates
//! 3. **Classification**: Label every retrieved title relevant / not relevant
//! 4. **Filtering**: Keep the relevant articles in retrieval order
//! 5. **Output**: Render JSON or Markdown to stdout or a file

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod classifier;
mod cli;
mod config;
mod filter;
mod models;
mod outputs;
mod pipeline;
mod planner;
mod utils;

use api::NewsApiClient;
use classifier::RelevanceModel;
use cli::{Cli, OutputFormat};
use config::{FileConfig, Settings};
use outputs::{json, markdown, write_output};
use planner::QueryPlanner;
use utils::ensure_writable_parent;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("relevant_news starting up");

    let args = Cli::parse();
    debug!(q = %args.q, from_date = %args.from_date, to_date = %args.to_date, "Parsed CLI arguments");

    // ---- Configuration ----
    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(file_config, &args).inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;

    // ---- Model: loaded once, shared read-only ----
    let model = match RelevanceModel::load(&settings.model_path) {
        Ok(model) => Arc::new(model),
        Err(e) => {
            error!(path = %settings.model_path.display(), error = %e, "Relevance model unavailable; refusing to serve");
            return Err(e.into());
        }
    };

    // ---- Request ----
    let query = args.search_form().into_query().inspect_err(|e| {
        error!(error = %e, "Invalid search request");
    })?;

    // Early check: fail on a bad output path before spending a search
    if let Some(path) = &args.output {
        if let Err(e) = ensure_writable_parent(path).await {
            error!(path = %path, error = %e, "Output location is not writable");
            return Err(e);
        }
    }

    let client = NewsApiClient::new(
        &settings.base_url,
        settings.api_key.clone(),
        settings.request_timeout,
    )?;
    let planner = QueryPlanner::new(client)
        .with_page_size(settings.page_size)
        .with_policy(settings.fallback);

    let relevant = match pipeline::relevant_articles(&planner, model.as_ref(), &query).await {
        Ok(relevant) => relevant,
        Err(e) => {
            error!(error = %e, "Search failed");
            return Err(e.into());
        }
    };
    let relevant_count = relevant.len();
    if relevant.is_empty() {
        info!(term = %query.term(), "No relevant articles for this search");
    }
    let records = relevant.into_records(settings.keep_label);

    // ---- Output ----
    let rendered = match args.format {
        OutputFormat::Json => json::render(&records)?,
        OutputFormat::Markdown => markdown::render(query.term(), &records),
    };
    write_output(&rendered, args.output.as_deref()).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        relevant = relevant_count,
        format = ?args.format,
        "Execution complete"
    );

    Ok(())
}
