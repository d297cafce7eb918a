use serde_json::Value;

use super::{flatten, format_value};

/// Keys checked in order; the first one present is the headline answer.
const PRIORITY_KEYS: [&str; 4] = [
    "investment.net_monthly_cash_flow",
    "monthly_payment",
    "rent.monthly_rent",
    "ending_balance",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            let flat = flatten(map);
            for key in PRIORITY_KEYS {
                if let Some((_, val)) = flat.iter().find(|(k, v)| k == key && !v.is_null()) {
                    return verdict_suffix(&flat, format_value(val));
                }
            }
            match flat.first() {
                Some((key, val)) => format!("{}: {}", key, format_value(val)),
                None => String::new(),
            }
        }
        // Schedules: the final row's balance
        Value::Array(rows) => rows
            .last()
            .and_then(|row| row.get("ending_balance"))
            .map(format_value)
            .unwrap_or_default(),
        other => format_value(other),
    }
}

/// Append the yield band when an investment was analysed.
fn verdict_suffix(flat: &[(String, Value)], headline: String) -> String {
    match flat.iter().find(|(k, _)| k == "investment.yield_class") {
        Some((_, band)) => format!("{} ({})", headline, format_value(band)),
        None => headline,
    }
}
