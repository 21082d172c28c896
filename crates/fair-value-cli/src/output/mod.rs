pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into dotted keys, e.g. `market.market_price`.
/// Arrays are indexed (`growth_rates[0]`) unless `keep_arrays` is set.
pub(crate) fn flatten(value: &Value, keep_arrays: bool) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    if let Value::Object(map) = value {
        flatten_into("", map, keep_arrays, &mut out);
    }
    out
}

fn flatten_into(
    prefix: &str,
    map: &Map<String, Value>,
    keep_arrays: bool,
    out: &mut Vec<(String, Value)>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, keep_arrays, out),
            Value::Array(items) if !keep_arrays => {
                for (idx, item) in items.iter().enumerate() {
                    let indexed = format!("{name}[{idx}]");
                    match item {
                        Value::Object(inner) => flatten_into(&indexed, inner, keep_arrays, out),
                        other => out.push((indexed, other.clone())),
                    }
                }
            }
            other => out.push((name, other.clone())),
        }
    }
}

/// Render a scalar for a single cell.
pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_objects() {
        let v = json!({"fair_value": "63.9", "market": {"market_price": "228.5"}});
        let flat = flatten(&v, true);
        assert_eq!(flat.len(), 2);
        assert!(flat
            .iter()
            .any(|(k, v)| k == "market.market_price" && v == "228.5"));
    }

    #[test]
    fn test_flatten_indexes_arrays() {
        let v = json!({"growth_rates": ["0", "0.26"], "projections": [{"fcf": "1"}]});
        let flat = flatten(&v, false);
        let keys: Vec<&str> = flat.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"growth_rates[1]"));
        assert!(keys.contains(&"projections[0].fcf"));
    }

    #[test]
    fn test_format_scalar() {
        assert_eq!(format_scalar(&json!("0.1165")), "0.1165");
        assert_eq!(format_scalar(&json!(true)), "true");
        assert_eq!(format_scalar(&Value::Null), "");
    }
}
