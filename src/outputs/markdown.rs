//! Markdown rendering of the relevant set.
//!
//! Each article becomes one list item: a linked headline, then source, author
//! and publication time when present, then the description.

use crate::models::ArticleRecord;
use serde_json::Value;
use std::fmt::Write;

/// Render the results page for `term`.
pub fn render(term: &str, records: &[ArticleRecord]) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# Relevant articles for \"{}\"\n", escape(term));

    if records.is_empty() {
        md.push_str("_No relevant articles found._\n");
        return md;
    }

    for record in records {
        let title = match record.title() {
            "" => "(untitled)".to_string(),
            t => escape(t),
        };
        match str_field(record, "url") {
            Some(url) => {
                let _ = writeln!(md, "- [{}]({})", title, link_destination(url));
            }
            None => {
                let _ = writeln!(md, "- {}", title);
            }
        }

        let source = record
            .get("source")
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str);
        let meta: Vec<String> = [
            source,
            str_field(record, "author"),
            str_field(record, "publishedAt"),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .map(escape)
        .collect();
        if !meta.is_empty() {
            let _ = writeln!(md, "  - {}", meta.join(" · "));
        }
        if let Some(description) = str_field(record, "description").filter(|d| !d.is_empty()) {
            let _ = writeln!(md, "  - {}", escape(description));
        }
    }
    md
}

fn str_field<'a>(record: &'a ArticleRecord, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

/// Percent-encode the characters that end or split a link destination.
fn link_destination(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            ' ' | '(' | ')' | '<' | '>' | '\\' => {
                let _ = write!(out, "%{:02X}", c as u32);
            }
            c if c.is_control() => {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(out, "%{:02X}", b);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Escape characters that would change the structure of a list item.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '[' | ']' | '*' | '_' | '`' => {
                out.push('\\');
                out.push(c);
            }
            '\n' | '\r' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}
