//! JSON rendering of the relevant set.
//!
//! Each article is emitted exactly as the provider returned it (field order
//! included), optionally followed by a `"label": 1` field.

use crate::models::ArticleRecord;

/// Serialize records as a pretty-printed JSON array.
pub fn render(records: &[ArticleRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RelevantSet;
    use serde_json::{Value, json};

    fn record(value: Value) -> ArticleRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_render_preserves_fields_and_order() {
        let records = vec![
            record(json!({"title": "T1", "url": "https://example.com/1", "author": null})),
            record(json!({"title": "T3", "url": "https://example.com/3"})),
        ];
        let rendered = render(&records).unwrap();
        let back: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(back[0]["title"], "T1");
        assert_eq!(back[0]["author"], Value::Null);
        assert_eq!(back[1]["title"], "T3");
        assert!(rendered.find("\"title\"").unwrap() < rendered.find("\"url\"").unwrap());
    }

    #[test]
    fn test_render_with_label() {
        let set = RelevantSet::new(vec![record(json!({"title": "T1"}))]);
        let back: Value = serde_json::from_str(&render(&set.into_records(true)).unwrap()).unwrap();
        assert_eq!(back, json!([{"title": "T1", "label": 1}]));
    }
}
