//! Title relevance classification.
//!
//! The model is a bag-of-words vectorizer followed by a linear decision rule,
//! exported from a trained count-vectorizer + logistic-regression pipeline as a
//! single JSON artifact:
//!
//! ```json
//! {
//!   "vectorizer": {
//!     "vocabulary": { "climate": 0, "warming": 1 },
//!     "lowercase": true,
//!     "token_pattern": "(?u)\\b\\w\\w+\\b",
//!     "ngram_range": [1, 1],
//!     "binary": false
//!   },
//!   "classifier": { "coef": [1.3, 0.8], "intercept": -0.5 }
//! }
//! ```
//!
//! The artifact is loaded once at startup and never changes afterwards, so a
//! single [`RelevanceModel`] can be shared by reference (or `Arc`) between any
//! number of concurrent callers.

use crate::models::Label;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Token pattern used when the artifact does not specify one.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

static DEFAULT_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_TOKEN_PATTERN).expect("default token pattern compiles"));

/// Failures while loading a model artifact. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// Anything that can assign relevance labels to a batch of titles.
pub trait RelevanceClassifier {
    /// One label per title, in input order.
    fn classify(&self, titles: &[&str]) -> Vec<Label>;
}

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    vectorizer: VectorizerSpec,
    classifier: LinearSpec,
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VectorizerSpec {
    vocabulary: HashMap<String, usize>,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    binary: bool,
}

#[derive(Debug, Deserialize)]
struct LinearSpec {
    coef: Vec<f64>,
    intercept: f64,
}

/// Word-count feature extraction over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct BagOfWords {
    vocabulary: HashMap<String, usize>,
    lowercase: bool,
    token_regex: Regex,
    ngram_range: (usize, usize),
    binary: bool,
}

impl BagOfWords {
    fn from_spec(spec: VectorizerSpec) -> Result<Self, ModelError> {
        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelError::Invalid(format!(
                "ngram_range ({min_n}, {max_n}) must satisfy 1 <= min <= max"
            )));
        }
        let token_regex = if spec.token_pattern == DEFAULT_TOKEN_PATTERN {
            DEFAULT_TOKEN_REGEX.clone()
        } else {
            Regex::new(&spec.token_pattern)
                .map_err(|e| ModelError::Invalid(format!("token_pattern: {e}")))?
        };
        Ok(Self {
            vocabulary: spec.vocabulary,
            lowercase: spec.lowercase,
            token_regex,
            ngram_range: spec.ngram_range,
            binary: spec.binary,
        })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        self.token_regex
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Sparse feature vector (`index -> value`) for one document.
    ///
    /// Terms outside the vocabulary are ignored.
    pub fn transform(&self, text: &str) -> BTreeMap<usize, f64> {
        let tokens = self.tokens(text);
        let (min_n, max_n) = self.ngram_range;
        let mut features = BTreeMap::new();

        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&idx) = self.vocabulary.get(&term) {
                    let slot = features.entry(idx).or_insert(0.0);
                    if self.binary {
                        *slot = 1.0;
                    } else {
                        *slot += 1.0;
                    }
                }
            }
        }
        features
    }
}

/// `intercept + coef · x > 0` decision rule.
#[derive(Debug, Clone)]
pub struct LinearDecision {
    coef: Vec<f64>,
    intercept: f64,
}

impl LinearDecision {
    pub fn score(&self, features: &BTreeMap<usize, f64>) -> f64 {
        features
            .iter()
            .fold(self.intercept, |acc, (&idx, &value)| acc + self.coef[idx] * value)
    }
}

/// The loaded, immutable relevance model.
#[derive(Debug, Clone)]
pub struct RelevanceModel {
    vectorizer: BagOfWords,
    decision: LinearDecision,
}

impl RelevanceModel {
    /// Load and validate a model artifact from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the file cannot be read, is not a model
    /// artifact, or is internally inconsistent.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let model = Self::from_json(&raw)?;
        info!(
            vocabulary = model.vectorizer.vocabulary_size(),
            ngram_range = ?model.vectorizer.ngram_range,
            "Loaded relevance model"
        );
        Ok(model)
    }

    /// Parse and validate a model artifact from its JSON text.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;
        let dims = artifact.classifier.coef.len();
        let vocab_size = artifact.vectorizer.vocabulary.len();
        if dims != vocab_size {
            return Err(ModelError::Invalid(format!(
                "classifier has {dims} coefficients but vocabulary has {vocab_size} terms"
            )));
        }
        if let Some((term, idx)) = artifact
            .vectorizer
            .vocabulary
            .iter()
            .find(|&(_, &idx)| idx >= dims)
        {
            return Err(ModelError::Invalid(format!(
                "vocabulary term `{term}` has index {idx} outside 0..{dims}"
            )));
        }
        if !artifact.classifier.intercept.is_finite()
            || artifact.classifier.coef.iter().any(|c| !c.is_finite())
        {
            return Err(ModelError::Invalid("non-finite classifier weight".to_string()));
        }

        Ok(Self {
            vectorizer: BagOfWords::from_spec(artifact.vectorizer)?,
            decision: LinearDecision {
                coef: artifact.classifier.coef,
                intercept: artifact.classifier.intercept,
            },
        })
    }

    /// Raw decision score for a single title; positive means relevant.
    pub fn decision_function(&self, title: &str) -> f64 {
        self.decision.score(&self.vectorizer.transform(title))
    }
}

impl RelevanceClassifier for RelevanceModel {
    fn classify(&self, titles: &[&str]) -> Vec<Label> {
        let labels: Vec<Label> = titles
            .iter()
            .map(|title| Label::from(self.decision_function(title) > 0.0))
            .collect();
        debug!(
            count = labels.len(),
            relevant = labels.iter().filter(|l| l.is_relevant()).count(),
            "Classified titles"
        );
        labels
    }
}
