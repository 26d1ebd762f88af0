//! Reduce a labeled batch to its relevant subset.

use crate::models::{ArticleBatch, Label, LabeledArticle, RelevantSet};
use itertools::Itertools;

/// Attach labels to records positionally.
///
/// # Panics
///
/// Panics if `labels.len() != batch.len()`. Both must come from the same batch
/// in the same request; a mismatch is a programming error.
pub fn label_batch(batch: ArticleBatch, labels: &[Label]) -> Vec<LabeledArticle> {
    batch
        .into_iter()
        .zip_eq(labels.iter().copied())
        .map(|(record, label)| LabeledArticle { record, label })
        .collect()
}

/// Keep the records labeled [`Label::Relevant`], in their original order.
///
/// # Panics
///
/// Same contract as [`label_batch`].
pub fn filter(batch: ArticleBatch, labels: &[Label]) -> RelevantSet {
    let relevant = label_batch(batch, labels)
        .into_iter()
        .filter(|article| article.label.is_relevant())
        .map(|article| article.record)
        .collect();
    RelevantSet::new(relevant)
}
