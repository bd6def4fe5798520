use serde_json::Value;

use crate::output::cash_flow_table;
use crate::output::money::format_money;

/// Print just the key answer value from the output.
///
/// For a cash-flow table that is the grand total collected (and the present
/// value when one was requested); otherwise the first field of the result.
pub fn print_minimal(value: &Value) {
    if let Some(table) = cash_flow_table(value) {
        println!("{}", format_money(table.grand_total()));
        if let Some(pv) = value
            .get("present_value")
            .and_then(|pv| pv.get("present_value"))
        {
            println!("present_value: {}", format_minimal(pv));
        }
        return;
    }

    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
            }
        }
        Value::Array(items) => println!("{} record(s)", items.len()),
        other => println!("{}", format_minimal(other)),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
