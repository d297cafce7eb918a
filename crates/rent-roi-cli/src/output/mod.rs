pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use rent_roi_core::cash_flow::{round_currency, round_percent};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into dotted keys (`investment.down_payment`).
/// Arrays are kept whole so callers can render them as their own tables.
pub(crate) fn flatten(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into("", map, &mut out);
    out
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&path, inner, out),
            other => out.push((path, other.clone())),
        }
    }
}

/// Render a scalar for humans. Decimal strings are rounded to cents here and
/// only here; the core never rounds.
pub(crate) fn format_value(value: &Value) -> String {
    format_field("", value)
}

/// As [`format_value`], rounding percentage fields as percentages.
pub(crate) fn format_field(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) => match Decimal::from_str(s) {
            Ok(d) if is_percent_key(key) => round_percent(d).to_string(),
            Ok(d) => round_currency(d).to_string(),
            Err(_) => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn is_percent_key(key: &str) -> bool {
    let field = key.rsplit('.').next().unwrap_or(key);
    ["_percent", "_rate", "_yield", "_return"]
        .iter()
        .any(|suffix| field.ends_with(suffix))
}
