pub mod chart;
pub mod csv_out;
pub mod export;
pub mod json;
pub mod minimal;
pub mod money;
pub mod table;

use presales_core::cash_flow::table::CashFlowTable;
use serde_json::Value;

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
        OutputFormat::Chart => chart::print_chart(value),
    }
}

/// Recover the cash-flow table from a computation envelope, if that is
/// what `value` holds.
pub fn cash_flow_table(value: &Value) -> Option<CashFlowTable> {
    let result = value.get("result")?;
    serde_json::from_value(result.clone()).ok()
}
