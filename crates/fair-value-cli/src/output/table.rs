use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, format_scalar};

/// Format output as tables using the tabled crate.
///
/// Scalars (and nested objects, flattened) go into one Field/Value table;
/// each array of objects, such as the yearly projections, gets its own table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_fields(value);
            }
        }
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    print_fields(result);

    if let Value::Object(res_map) = result {
        for (key, val) in res_map {
            if let Value::Array(rows) = val {
                if rows.iter().any(|r| r.is_object()) {
                    println!("\n{}:", key);
                    print_rows(rows);
                }
            }
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(value: &Value) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten(value, true) {
        if let Value::Array(items) = &val {
            if items.iter().any(|i| i.is_object()) {
                continue;
            }
            let joined: Vec<String> = items.iter().map(format_scalar).collect();
            builder.push_record([key, joined.join(", ")]);
        } else {
            builder.push_record([key, format_scalar(&val)]);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let rows: Vec<Vec<(String, Value)>> = arr.iter().map(|item| flatten(item, true)).collect();
    if rows.iter().all(|r| r.is_empty()) {
        for item in arr {
            println!("{}", format_scalar(item));
        }
        return;
    }

    let headers: Vec<String> = rows[0].iter().map(|(k, _)| k.clone()).collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in &rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| {
                row.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| format_scalar(v))
                    .unwrap_or_default()
            })
            .collect();
        builder.push_record(cells);
    }
    println!("{}", Table::from(builder));
}
