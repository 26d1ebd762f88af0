//! Query planning with date-range fallback.
//!
//! The provider enforces a date window it does not publish. Rather than guess
//! the window up front, the planner sends the most specific query the caller
//! asked for and, if that is refused, repeats it once with the term alone.
//!
//! | Dates supplied | First call          | On failure         |
//! |----------------|---------------------|--------------------|
//! | none           | term                | error propagates   |
//! | `to` only      | term + to           | term only          |
//! | `from` only    | term + from         | term only          |
//! | both           | term + from + to    | term only          |

use crate::api::{ArticleRetriever, RetrievalError, SearchParams};
use crate::models::{ArticleBatch, PAGE_SIZE, Query};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

/// Which failures of a date-bounded call trigger the term-only retry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Retry after any failure of the date-bounded call.
    #[default]
    AnyFailure,
    /// Retry only when the provider rejected the parameters.
    RejectionOnly,
}

impl FallbackPolicy {
    fn allows(self, err: &RetrievalError) -> bool {
        match self {
            FallbackPolicy::AnyFailure => true,
            FallbackPolicy::RejectionOnly => err.is_rejection(),
        }
    }
}

/// Shape of the first retrieval call for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    TermOnly,
    UpperBound,
    LowerBound,
    Window,
}

impl Plan {
    pub fn for_query(query: &Query) -> Self {
        match (query.from_date(), query.to_date()) {
            (None, None) => Plan::TermOnly,
            (None, Some(_)) => Plan::UpperBound,
            (Some(_), None) => Plan::LowerBound,
            (Some(_), Some(_)) => Plan::Window,
        }
    }
}

/// Issues retrieval calls for a [`Query`] and recovers from refused date bounds.
#[derive(Debug)]
pub struct QueryPlanner<R> {
    retriever: R,
    page_size: usize,
    policy: FallbackPolicy,
}

impl<R> QueryPlanner<R>
where
    R: ArticleRetriever,
{
    pub fn new(retriever: R) -> Self {
        Self {
            retriever,
            page_size: PAGE_SIZE,
            policy: FallbackPolicy::default(),
        }
    }

    /// Page size for every call; clamped to `1..=PAGE_SIZE`.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, PAGE_SIZE);
        self
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[cfg(test)]
    pub fn retriever(&self) -> &R {
        &self.retriever
    }

    /// Fetch one page of articles for `query`.
    ///
    /// A refused date-bounded call is logged and replaced by a single term-only
    /// call. Only the failure of a term-only call is returned to the caller
    /// (or, under [`FallbackPolicy::RejectionOnly`], a non-rejection failure).
    #[instrument(level = "info", skip_all, fields(term = %query.term(), from_date = ?query.from_date(), to_date = ?query.to_date()))]
    pub async fn plan_and_fetch(&self, query: &Query) -> Result<ArticleBatch, RetrievalError> {
        let plan = Plan::for_query(query);
        let term_only = SearchParams::term_only(query.term(), self.page_size);

        if !query.has_dates() {
            return self.retriever.search(&term_only).await.inspect_err(|e| {
                error!(error = %e, "Term-only search failed");
            });
        }

        let bounded = SearchParams {
            from_date: query.from_date().map(str::to_string),
            to_date: query.to_date().map(str::to_string),
            ..term_only.clone()
        };

        match self.retriever.search(&bounded).await {
            Ok(batch) => {
                info!(?plan, count = batch.len(), "Date-bounded search succeeded");
                Ok(batch)
            }
            Err(e) if self.policy.allows(&e) => {
                warn!(?plan, error = %e, "Date was likely out of range; retrying without dates");
                self.retriever.search(&term_only).await.inspect_err(|e| {
                    error!(error = %e, "Fallback search without dates failed");
                })
            }
            Err(e) => {
                error!(
                    ?plan,
                    policy = ?self.policy,
                    error = %e,
                    "Date-bounded search failed (date may be out of range); not retrying"
                );
                Err(e)
            }
        }
    }
}
