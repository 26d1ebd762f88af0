//! Rendering of the relevant set.
//!
//! # Submodules
//!
//! - [`json`]: a JSON array of article objects, fields as the provider sent them
//! - [`markdown`]: a readable list of linked headlines
//!
//! Output goes to stdout unless a file path is given; see [`write_output`].

pub mod json;
pub mod markdown;

use std::error::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// Write rendered output to `path`, or to stdout when `path` is `None`.
#[instrument(level = "info", skip_all, fields(path = ?path, bytes = rendered.len()))]
pub async fn write_output(rendered: &str, path: Option<&str>) -> Result<(), Box<dyn Error>> {
    match path {
        Some(path) => {
            fs::write(path, rendered).await?;
            info!("Wrote results file");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(rendered.as_bytes()).await?;
            if !rendered.ends_with('\n') {
                stdout.write_all(b"\n").await?;
            }
            stdout.flush().await?;
        }
    }
    Ok(())
}
