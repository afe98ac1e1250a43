use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten, result_of, row_array, scalar_text};

/// Arrays longer than this are summarised rather than printed inline.
const MAX_INLINE_ARRAY: usize = 8;

/// Keys rendered as their own row table after the field summary.
const ROW_TABLES: [&str; 2] = ["points", "assets"];

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    let mut fields = Vec::new();
    if let Value::Object(map) = result {
        for (key, val) in map {
            if ROW_TABLES.contains(&key.as_str()) && row_array(result, key).is_some() {
                continue;
            }
            flatten(key, val, Some(MAX_INLINE_ARRAY), &mut fields);
        }
    } else {
        println!("{}", scalar_text(result));
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in &fields {
        builder.push_record([key.as_str(), &scalar_text(val)]);
    }
    println!("{}", Table::from(builder));

    for key in ROW_TABLES {
        if let Some(rows) = row_array(result, key) {
            println!("\n{}:", key);
            print_rows(rows);
        }
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h.as_str()).map(scalar_text).unwrap_or_default())
            .collect();
        builder.push_record(cells);
    }
    println!("{}", Table::from(builder));
}
