use serde_json::Value;

use super::{result_of, scalar_text};

/// Headline figure of each run, in priority order. Dotted keys descend into
/// nested objects.
const PRIORITY_KEYS: [&str; 5] = [
    "empirical_var",
    "risk.empirical_var",
    "empirical_mean",
    "min_volatility",
    "analytical_var",
];

/// Print just the headline value of the output, falling back to the first
/// field of the result.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    for key in PRIORITY_KEYS {
        if let Some(val) = lookup(result, key).filter(|v| !v.is_null()) {
            println!("{}", scalar_text(val));
            return;
        }
    }

    if let Some((key, val)) = result.as_object().and_then(|m| m.iter().next()) {
        println!("{}: {}", key, scalar_text(val));
        return;
    }
    println!("{}", scalar_text(result));
}

fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted.split('.').try_fold(value, |v, part| v.get(part))
}
