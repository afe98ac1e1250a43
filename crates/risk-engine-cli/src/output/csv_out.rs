use serde_json::Value;
use std::io;

use super::{flatten, result_of, row_array, scalar_text};

/// Write output as CSV to stdout.
///
/// A correlation sweep prints its grid (`rho, portfolio_variance, ...`);
/// every other result prints two columns, `field,value`, with nested fields
/// dotted and arrays kept as inline JSON.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let result = result_of(value);

    if let Some(rows) = row_array(result, "points") {
        write_rows(&mut wtr, rows);
    } else {
        let mut fields = Vec::new();
        flatten("", result, None, &mut fields);
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in &fields {
            let _ = wtr.write_record([key.as_str(), &scalar_text(val)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(scalar_text).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&cells);
    }
}
