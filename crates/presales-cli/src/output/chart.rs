use colored::Colorize;
use presales_core::cash_flow::table::{CashFlowTable, MonthlyTotal};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::output::cash_flow_table;
use crate::output::money::format_money;

const BAR_WIDTH: usize = 50;

/// Print monthly totals as a horizontal bar chart.
pub fn print_chart(value: &Value) {
    match cash_flow_table(value) {
        Some(table) => {
            println!("{}", "Cash-flow distribution by month".bold());
            for line in chart_lines(&table) {
                println!("{}", line);
            }
        }
        None => eprintln!("chart output is only available for cash-flow tables"),
    }
}

/// One line per month: label, bar scaled to the largest month, amount.
pub fn chart_lines(table: &CashFlowTable) -> Vec<String> {
    let series = table.monthly_totals();
    let peak = series
        .iter()
        .map(|m| m.amount)
        .max()
        .unwrap_or(Decimal::ZERO);
    let label_width = series.iter().map(|m| m.label.len()).max().unwrap_or(0);

    series
        .iter()
        .map(|m| {
            let bar = format!("{:<BAR_WIDTH$}", "█".repeat(bar_length(m, peak)));
            format!(
                "{:<label_width$} | {} {}",
                m.label,
                bar.cyan(),
                format_money(m.amount)
            )
        })
        .collect()
}

fn bar_length(point: &MonthlyTotal, peak: Decimal) -> usize {
    if peak <= Decimal::ZERO || point.amount <= Decimal::ZERO {
        return 0;
    }
    let scaled = (point.amount / peak * Decimal::from(BAR_WIDTH as u64)).round();
    scaled.to_usize().unwrap_or(0).clamp(1, BAR_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn point(amount: Decimal) -> MonthlyTotal {
        MonthlyTotal {
            month: 1,
            label: "month 1".into(),
            amount,
        }
    }

    #[test]
    fn test_peak_month_fills_bar() {
        assert_eq!(bar_length(&point(dec!(270)), dec!(270)), BAR_WIDTH);
    }

    #[test]
    fn test_scaled_and_minimum_bars() {
        assert_eq!(bar_length(&point(dec!(135)), dec!(270)), 25);
        assert_eq!(bar_length(&point(dec!(0.01)), dec!(270)), 1);
        assert_eq!(bar_length(&point(dec!(0)), dec!(270)), 0);
    }

    #[test]
    fn test_all_zero_series() {
        assert_eq!(bar_length(&point(dec!(0)), dec!(0)), 0);
    }
}
