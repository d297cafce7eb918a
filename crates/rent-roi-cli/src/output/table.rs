use colored::Colorize;
use rent_roi_core::cash_flow::YieldClass;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, format_field, format_value};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_fields(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_fields(res_map),
        Value::Array(arr) => print_array_table(arr),
        other => println!("{}", format_value(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s.yellow());
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Scalars go into one Field/Value table; nested arrays (the amortization
/// schedule) follow as their own tables.
fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut arrays = Vec::new();

    for (key, val) in flatten(map) {
        match val {
            Value::Array(arr) if arr.iter().any(Value::is_object) => arrays.push((key, arr)),
            other => {
                let text = highlight(&key, &other);
                builder.push_record([key, text]);
            }
        }
    }

    println!("{}", Table::from(builder));

    for (key, arr) in arrays {
        println!("\n{}:", key);
        print_array_table(&arr);
    }
}

/// Colour the two decision signals the way a reader scans for them.
fn highlight(key: &str, value: &Value) -> String {
    let text = format_field(key, value);
    if key.ends_with("yield_class") {
        return match serde_json::from_value::<YieldClass>(value.clone()) {
            Ok(class) => {
                let label = match class {
                    YieldClass::Excellent => text.green().bold(),
                    YieldClass::Good => text.yellow().bold(),
                    YieldClass::Poor => text.red().bold(),
                };
                format!("{} - {}", label, class.interpretation())
            }
            Err(_) => text,
        };
    }
    if key.ends_with("is_good_investment") {
        return match value {
            Value::Bool(true) => text.green().bold().to_string(),
            _ => text.red().bold().to_string(),
        };
    }
    text
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}
