use presales_core::cash_flow::table::{Cell, CashFlowTable};
use serde_json::Value;
use tabled::{builder::Builder, Table};

use crate::output::cash_flow_table;
use crate::output::money::format_money;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    if let Some(table) = cash_flow_table(value) {
        println!("{}", render_cash_flow(&table));
        print_envelope_notes(value);
        return;
    }

    match value {
        Value::Array(arr) => print_array_table(arr),
        Value::Object(_) => print_flat_object(value),
        _ => println!("{}", value),
    }
}

/// Units as rows, months as columns, the total row last.
pub fn render_cash_flow(table: &CashFlowTable) -> Table {
    let tabular = table.to_tabular();
    let mut builder = Builder::default();
    builder.push_record(tabular.columns.iter().cloned());
    for row in &tabular.rows {
        builder.push_record(row.iter().map(|c| match c {
            Cell::Text(s) => s.clone(),
            Cell::Amount(a) => format_money(*a),
            Cell::Blank => String::new(),
        }));
    }
    builder.build()
}

fn print_envelope_notes(envelope: &Value) {
    if let Some(pv) = envelope.get("present_value") {
        let rate = pv.get("annual_rate").map(format_value).unwrap_or_default();
        let amount = pv.get("present_value").map(format_value).unwrap_or_default();
        println!("\nPresent value at {} annual: {}", rate, amount);
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

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.clone(), format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array_table(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        if arr.is_empty() {
            println!("(empty)");
        }
        for item in arr {
            println!("{}", format_value(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for item in arr {
        if let Value::Object(map) = item {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
