//! Data models for queries, retrieved articles and their relevance labels.
//!
//! This module defines the request-scoped data that flows through the pipeline:
//! - [`SearchForm`] / [`Query`]: what the caller asked for
//! - [`ArticleRecord`] / [`ArticleBatch`]: what the provider returned
//! - [`Label`] / [`LabeledArticle`]: what the classifier decided
//! - [`RelevantSet`]: what is handed to the renderer
//!
//! Article records are kept as ordered JSON objects rather than a fixed struct.
//! Only `title` is read by the pipeline; every other field is passed through
//! exactly as the provider sent it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Maximum number of articles returned by one retrieval call.
pub const PAGE_SIZE: usize = 100;

/// Errors raised while turning a request into a [`Query`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("search term `q` must not be empty")]
    EmptyTerm,
}

/// The request interface: the three form fields exactly as submitted.
///
/// An empty string in `from_date` or `to_date` means the bound is absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchForm {
    /// The search term.
    pub q: String,
    /// Lower date bound, or `""`.
    #[serde(default)]
    pub from_date: String,
    /// Upper date bound, or `""`.
    #[serde(default)]
    pub to_date: String,
}

impl SearchForm {
    /// Validate the form and map empty date strings to `None`.
    pub fn into_query(self) -> Result<Query, QueryError> {
        Query::new(self.q, non_empty(self.from_date), non_empty(self.to_date))
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// A single search request.
///
/// Dates are opaque caller-supplied strings. They are not parsed here; the
/// retrieval provider decides whether it accepts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    term: String,
    from_date: Option<String>,
    to_date: Option<String>,
}

impl Query {
    pub fn new(
        term: impl Into<String>,
        from_date: Option<String>,
        to_date: Option<String>,
    ) -> Result<Self, QueryError> {
        let term = term.into();
        if term.trim().is_empty() {
            return Err(QueryError::EmptyTerm);
        }
        Ok(Self {
            term,
            from_date,
            to_date,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn from_date(&self) -> Option<&str> {
        self.from_date.as_deref()
    }

    pub fn to_date(&self) -> Option<&str> {
        self.to_date.as_deref()
    }

    /// Whether either date bound was supplied.
    pub fn has_dates(&self) -> bool {
        self.from_date.is_some() || self.to_date.is_some()
    }
}

/// One article as returned by the provider.
///
/// Field order is preserved (`serde_json` is built with `preserve_order`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ArticleRecord(Map<String, Value>);

impl ArticleRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The article title, or `""` when the field is missing or not a string.
    pub fn title(&self) -> &str {
        self.0.get("title").and_then(Value::as_str).unwrap_or("")
    }

    /// Look up an arbitrary pass-through field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

/// Articles from one retrieval call, in the provider's ranking order.
pub type ArticleBatch = Vec<ArticleRecord>;

/// Binary relevance label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    NotRelevant = 0,
    Relevant = 1,
}

impl Label {
    pub fn is_relevant(self) -> bool {
        self == Label::Relevant
    }
}

impl From<bool> for Label {
    fn from(relevant: bool) -> Self {
        if relevant {
            Label::Relevant
        } else {
            Label::NotRelevant
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label as u8
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::NotRelevant),
            1 => Ok(Label::Relevant),
            other => Err(format!("invalid relevance label {other}")),
        }
    }
}

/// An article together with the label the classifier assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArticle {
    pub record: ArticleRecord,
    pub label: Label,
}

/// The label-1 subsequence of a batch, in retrieval order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelevantSet {
    articles: Vec<ArticleRecord>,
}

impl RelevantSet {
    pub fn new(articles: Vec<ArticleRecord>) -> Self {
        Self { articles }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &ArticleRecord> {
        self.articles.iter()
    }

    /// Plain records for display.
    ///
    /// With `keep_label` each record gets a trailing `"label": 1` field, the
    /// same shape the classifier output had before filtering.
    pub fn into_records(self, keep_label: bool) -> Vec<ArticleRecord> {
        if !keep_label {
            return self.articles;
        }
        self.articles
            .into_iter()
            .map(|record| {
                let mut fields = record.into_fields();
                fields.insert("label".to_string(), Value::from(u8::from(Label::Relevant)));
                ArticleRecord::new(fields)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ArticleRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_form_with_empty_dates_has_no_bounds() {
        let form = SearchForm {
            q: "climate".to_string(),
            from_date: String::new(),
            to_date: String::new(),
        };
        let query = form.into_query().unwrap();
        assert_eq!(query.term(), "climate");
        assert_eq!(query.from_date(), None);
        assert_eq!(query.to_date(), None);
        assert!(!query.has_dates());
    }

    #[test]
    fn test_form_keeps_supplied_dates_verbatim() {
        let form: SearchForm = serde_json::from_value(json!({
            "q": "x",
            "from_date": "1900-01-01",
            "to_date": ""
        }))
        .unwrap();
        let query = form.into_query().unwrap();
        assert_eq!(query.from_date(), Some("1900-01-01"));
        assert_eq!(query.to_date(), None);
        assert!(query.has_dates());
    }

    #[test]
    fn test_form_missing_date_fields_default_to_absent() {
        let form: SearchForm = serde_json::from_value(json!({ "q": "x" })).unwrap();
        let query = form.into_query().unwrap();
        assert!(!query.has_dates());
    }

    #[test]
    fn test_empty_term_is_rejected() {
        assert_eq!(Query::new("  ", None, None), Err(QueryError::EmptyTerm));
    }

    #[test]
    fn test_title_falls_back_to_empty_string() {
        assert_eq!(record(json!({"title": "Headline"})).title(), "Headline");
        assert_eq!(record(json!({"url": "https://example.com"})).title(), "");
        assert_eq!(record(json!({"title": null})).title(), "");
    }

    #[test]
    fn test_record_preserves_field_order_and_extra_fields() {
        let raw = r#"{"source":{"id":null,"name":"Example"},"title":"T","url":"https://example.com/a","publishedAt":"2025-05-06T10:00:00Z"}"#;
        let rec: ArticleRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&rec).unwrap(), raw);
        assert_eq!(rec.get("source").unwrap()["name"], "Example");
    }

    #[test]
    fn test_label_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Label::Relevant).unwrap(), "1");
        assert_eq!(serde_json::from_str::<Label>("0").unwrap(), Label::NotRelevant);
        assert!(serde_json::from_str::<Label>("2").is_err());
    }

    #[test]
    fn test_into_records_without_label_is_unchanged() {
        let rec = record(json!({"title": "T1", "url": "u"}));
        let set = RelevantSet::new(vec![rec.clone()]);
        assert_eq!(set.into_records(false), vec![rec]);
    }

    #[test]
    fn test_into_records_with_label_appends_field() {
        let set = RelevantSet::new(vec![record(json!({"title": "T1"}))]);
        let records = set.into_records(true);
        let json = serde_json::to_string(&records[0]).unwrap();
        assert_eq!(json, r#"{"title":"T1","label":1}"#);
    }
}
