use serde_json::Value;
use std::io;

use super::{flatten, format_scalar};

/// Write output as a two-column `field,value` CSV to stdout.
///
/// Nested objects and arrays inside the result are flattened into dotted,
/// indexed field names such as `projections[2].discounted_fcf`.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let _ = wtr.write_record(["field", "value"]);
    match body {
        Value::Object(_) => {
            for (key, val) in flatten(body, false) {
                let _ = wtr.write_record([key, format_scalar(&val)]);
            }
        }
        other => {
            let _ = wtr.write_record(["value".to_string(), format_scalar(other)]);
        }
    }

    let _ = wtr.flush();
}
