//! News search provider access.
//!
//! This module defines the retrieval seam of the pipeline and its production
//! implementation against the NewsAPI `/v2/everything` endpoint.
//!
//! # Architecture
//!
//! - [`ArticleRetriever`]: trait for any search provider (query + date range in,
//!   one page of articles out)
//! - [`NewsApiClient`]: HTTP implementation over `reqwest`
//! - [`RetrievalError`]: the two ways a search can fail
//!
//! # Failure classes
//!
//! The provider's valid date window is not published and depends on the account
//! tier, so a request with a date bound may be refused. Those refusals come back
//! as [`RetrievalError::Rejected`]. Everything else (transport failure, bad API
//! key, rate limiting, unreadable body) is [`RetrievalError::Unavailable`].

use crate::models::{ArticleBatch, ArticleRecord};
use crate::utils::truncate_for_log;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Default provider base URL.
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// Provider error codes that mean "this combination of parameters is not
/// accepted", as opposed to an account or service problem.
const REJECTION_CODES: &[&str] = &[
    "parameterInvalid",
    "parametersIncompatible",
    "parametersMissing",
];

/// Why a retrieval call failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RetrievalError {
    /// The provider refused the parameters (typically a date outside its window).
    #[error("search rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    /// The provider could not be reached or refused the caller.
    #[error("search provider unavailable: {0}")]
    Unavailable(String),
}

impl RetrievalError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, RetrievalError::Rejected { .. })
    }
}

/// Parameters of one retrieval call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub term: String,
    pub page_size: usize,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl SearchParams {
    /// A call with no date bounds.
    pub fn term_only(term: &str, page_size: usize) -> Self {
        Self {
            term: term.to_string(),
            page_size,
            from_date: None,
            to_date: None,
        }
    }

    pub fn has_dates(&self) -> bool {
        self.from_date.is_some() || self.to_date.is_some()
    }
}

/// A black-box article search provider.
///
/// Implementations return at most `params.page_size` records, in the
/// provider's own ranking order.
pub trait ArticleRetriever {
    async fn search(&self, params: &SearchParams) -> Result<ArticleBatch, RetrievalError>;
}

/// Response envelope of `/v2/everything`.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum EverythingResponse {
    Ok {
        #[serde(default)]
        articles: Vec<ArticleRecord>,
    },
    Error {
        #[serde(default)]
        code: String,
        #[serde(default)]
        message: String,
    },
}

/// HTTP client for the NewsAPI "everything" search.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl NewsApiClient {
    /// Build a client for `base_url` (scheme and host, e.g. `https://newsapi.org`).
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Unavailable`] if the base URL does not parse or
    /// the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, RetrievalError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join("/v2/everything"))
            .map_err(|e| RetrievalError::Unavailable(format!("invalid base url {base_url}: {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RetrievalError::Unavailable(format!("http client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }

    fn request_url(&self, params: &SearchParams) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &params.term)
                .append_pair("pageSize", &params.page_size.to_string());
            if let Some(from) = &params.from_date {
                pairs.append_pair("from", from);
            }
            if let Some(to) = &params.to_date {
                pairs.append_pair("to", to);
            }
        }
        url
    }
}

impl ArticleRetriever for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(term = %params.term, from = ?params.from_date, to = ?params.to_date))]
    async fn search(&self, params: &SearchParams) -> Result<ArticleBatch, RetrievalError> {
        for date in [&params.from_date, &params.to_date].into_iter().flatten() {
            check_date_format(date)?;
        }

        let t0 = Instant::now();
        let url = self.request_url(params);
        debug!(%url, dated = params.has_dates(), "Querying news provider");

        let resp = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| RetrievalError::Unavailable(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RetrievalError::Unavailable(e.to_string()))?;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        let parsed: EverythingResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(
                status = status.as_u16(),
                elapsed_ms,
                error = %e,
                body_preview = %truncate_for_log(&body, 300),
                "Provider returned an unreadable body"
            );
            RetrievalError::Unavailable(format!("unreadable response (status {status}): {e}"))
        })?;

        match parsed {
            EverythingResponse::Ok { mut articles } => {
                articles.truncate(params.page_size);
                info!(count = articles.len(), elapsed_ms, "Retrieved articles");
                Ok(articles)
            }
            EverythingResponse::Error { code, message } => {
                warn!(status = status.as_u16(), %code, %message, elapsed_ms, "Provider returned an error");
                if REJECTION_CODES.contains(&code.as_str()) {
                    Err(RetrievalError::Rejected { code, message })
                } else {
                    Err(RetrievalError::Unavailable(format!("{code}: {message}")))
                }
            }
        }
    }
}

/// Accept `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`, the two forms the provider takes.
fn check_date_format(date: &str) -> Result<(), RetrievalError> {
    let ok = NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S").is_ok();
    if ok {
        Ok(())
    } else {
        Err(RetrievalError::Rejected {
            code: "invalidDateFormat".to_string(),
            message: format!("`{date}` is not YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"),
        })
    }
}
