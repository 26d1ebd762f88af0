//! One request through the whole pipeline: plan, retrieve, classify, filter.

use crate::api::{ArticleRetriever, RetrievalError};
use crate::classifier::RelevanceClassifier;
use crate::filter::filter;
use crate::models::{ArticleRecord, Query, RelevantSet};
use crate::planner::QueryPlanner;
use std::time::Instant;
use tracing::{info, instrument};

/// Fetch articles for `query` and keep the ones `classifier` marks relevant.
///
/// The only error is a retrieval failure that the planner could not recover
/// from. Classification and filtering cannot fail at runtime.
#[instrument(level = "info", skip_all, fields(term = %query.term()))]
pub async fn relevant_articles<R, C>(
    planner: &QueryPlanner<R>,
    classifier: &C,
    query: &Query,
) -> Result<RelevantSet, RetrievalError>
where
    R: ArticleRetriever,
    C: RelevanceClassifier + ?Sized,
{
    let t0 = Instant::now();
    let batch = planner.plan_and_fetch(query).await?;

    let titles: Vec<&str> = batch.iter().map(ArticleRecord::title).collect();
    let labels = classifier.classify(&titles);
    let retrieved = batch.len();
    let relevant = filter(batch, &labels);

    info!(
        retrieved,
        relevant = relevant.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Filtered articles to relevant set"
    );
    Ok(relevant)
}
