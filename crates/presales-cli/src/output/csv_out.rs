use presales_core::cash_flow::table::{Cell, CashFlowTable};
use serde_json::Value;
use std::io;

use crate::output::cash_flow_table;

/// Write output as CSV to stdout.
///
/// A cash-flow table is written in full with raw decimal amounts, followed
/// by a `present_value` row when one was requested. Anything else falls back
/// to one line per record or field.
pub fn print_csv(value: &Value) {
    write_csv(io::stdout().lock(), value);
}

fn write_csv<W: io::Write>(out: W, value: &Value) {
    let mut wtr = csv::Writer::from_writer(out);

    if let Some(table) = cash_flow_table(value) {
        write_table_csv(&mut wtr, &table);
        if let Some(pv) = value
            .get("present_value")
            .and_then(|pv| pv.get("present_value"))
        {
            let width = table.columns().len();
            let mut record = vec!["present_value".to_string(), format_csv_value(pv)];
            record.resize(width.max(2), String::new());
            let _ = wtr.write_record(&record);
        }
    } else {
        match value {
            Value::Array(arr) => write_array_csv(&mut wtr, arr),
            Value::Object(map) => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
            _ => {
                let _ = wtr.write_record([&format_csv_value(value)]);
            }
        }
    }

    let _ = wtr.flush();
}

fn write_table_csv<W: io::Write>(wtr: &mut csv::Writer<W>, table: &CashFlowTable) {
    let tabular = table.to_tabular();
    let _ = wtr.write_record(&tabular.columns);
    for row in &tabular.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|c| match c {
                Cell::Text(s) => s.clone(),
                Cell::Amount(a) => a.to_string(),
                Cell::Blank => String::new(),
            })
            .collect();
        let _ = wtr.write_record(&cells);
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    };

    // Headers from the first object
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
