//! Rendering of API responses for the terminal
//!
//! Lists become ASCII tables. Objects become right-aligned `key: value`
//! lines, with nested lists and objects indented under their key.

use crate::client::Response;
use serde_json::{Map, Value};
use tabled::builder::Builder;
use tabled::settings::Style;

const EMPTY: &str = "-- Empty Response --";

/// Print a response
///
/// A non-empty `headers` picks the table columns, or the keys kept from an
/// object.
pub fn display(resp: &Response, headers: &[&str]) {
    println!("{}", render(resp, headers));
}

/// Render a response as [`display`] would print it
pub fn render(resp: &Response, headers: &[&str]) -> String {
    let mut out = render_value(&resp.body, headers);
    if resp.code != 200 {
        out.push_str(&format!("\n\n-- HTTP Code: {} --", resp.code));
    }
    out
}

fn render_value(body: &Value, headers: &[&str]) -> String {
    match body {
        Value::Null => EMPTY.to_string(),
        Value::Array(rows) if rows.is_empty() => EMPTY.to_string(),
        Value::Object(map) if map.is_empty() => EMPTY.to_string(),
        Value::Array(rows) => render_table(rows, headers),
        Value::Object(map) => render_object(&filter(map, headers)),
        other => scalar(other),
    }
}

/// One row per item; columns are `headers` or the first row's keys
pub fn render_table(rows: &[Value], headers: &[&str]) -> String {
    let columns: Vec<String> = if headers.is_empty() {
        rows.first()
            .and_then(Value::as_object)
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default()
    } else {
        headers.iter().map(|h| h.to_string()).collect()
    };

    let mut builder = Builder::default();
    builder.push_record(columns.clone());
    for row in rows {
        builder.push_record(
            columns
                .iter()
                .map(|column| row.get(column).map(scalar).unwrap_or_default()),
        );
    }

    builder.build().with(Style::ascii()).to_string()
}

/// Aligned `key: value` lines for an object
pub fn render_object(map: &Map<String, Value>) -> String {
    pairs(map, 0)
}

fn filter(map: &Map<String, Value>, keep: &[&str]) -> Map<String, Value> {
    if keep.is_empty() {
        return map.clone();
    }
    map.iter()
        .filter(|(key, _)| keep.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn pairs(map: &Map<String, Value>, offset: usize) -> String {
    let longest = map.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    let width = offset + 4 + longest;
    map.iter()
        .map(|(key, value)| format!("{:>width$}: {}", key, format_value(value, width)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_value(value: &Value, offset: usize) -> String {
    match value {
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let indent = offset + 5;
            let lines: Vec<String> = items
                .iter()
                .map(|item| format!("{}{}", " ".repeat(indent), format_value(item, indent)))
                .collect();
            format!("[\n{}\n{}]", lines.join(",\n"), " ".repeat(offset + 2))
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => format!("{{\n{}\n{}}}", pairs(map, offset), " ".repeat(offset + 2)),
        other => scalar(other),
    }
}

/// Strings print bare; everything else prints as JSON
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
