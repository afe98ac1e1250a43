pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// The `result` object of a `ComputationOutput` envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// First array of objects directly under `result` (sweep grid, histogram).
pub(crate) fn row_array<'a>(result: &'a Value, key: &str) -> Option<&'a [Value]> {
    match result.get(key) {
        Some(Value::Array(rows)) if rows.first().map_or(false, Value::is_object) => Some(rows),
        _ => None,
    }
}

/// Flatten nested objects into dotted `field.sub` keys.
///
/// Arrays longer than `max_array` are summarised as `[n items]`; pass `None`
/// to keep every array inline as JSON.
pub(crate) fn flatten(
    prefix: &str,
    value: &Value,
    max_array: Option<usize>,
    out: &mut Vec<(String, Value)>,
) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&name, val, max_array, out);
            }
        }
        Value::Array(items) if max_array.map_or(false, |m| items.len() > m) => {
            out.push((prefix.to_string(), Value::String(format!("[{} items]", items.len()))));
        }
        _ => out.push((prefix.to_string(), value.clone())),
    }
}

pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
