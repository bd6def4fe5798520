use presales_core::cash_flow::table::{Cell, CashFlowTable};
use std::fs::File;
use std::io::Write;

use crate::output::money::format_money;

/// Write the cash-flow table as a spreadsheet-ready CSV file.
pub fn write_spreadsheet(path: &str, table: &CashFlowTable) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path).map_err(|e| format!("Failed to create '{}': {}", path, e))?;
    render_spreadsheet(file, table)
}

/// One header line, one line per unit, the total row last. Amounts are
/// formatted `#,##0.00`; blank cells stay empty.
pub fn render_spreadsheet<W: Write>(
    writer: W,
    table: &CashFlowTable,
) -> Result<(), Box<dyn std::error::Error>> {
    let tabular = table.to_tabular();
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&tabular.columns)?;
    for row in &tabular.rows {
        wtr.write_record(row.iter().map(spreadsheet_cell))?;
    }
    wtr.flush()?;
    Ok(())
}

fn spreadsheet_cell(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.clone(),
        Cell::Amount(a) => format_money(*a),
        Cell::Blank => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presales_core::allocation::sale_month::allocate;
    use presales_core::allocation::units::Unit;
    use presales_core::cash_flow::builder::build;
    use presales_core::cash_flow::schedule::PaymentTerms;
    use rust_decimal_macros::dec;

    #[test]
    fn test_spreadsheet_layout() {
        let units = vec![Unit::new("A", dec!(100000)), Unit::new("B", dec!(200000))];
        let terms = PaymentTerms {
            reserve_pct: dec!(10),
            disbursement_pct: dec!(90),
            reserve_months: 2,
            lag_months: 1,
        };
        let table = build(&allocate(&units, 2).unwrap(), &terms).unwrap();

        let mut buf = Vec::new();
        render_spreadsheet(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "unit,price,reserve,disbursement,monthly_reserve_installment,month 1,month 2,month 3,month 4"
        );
        assert!(lines[1].starts_with("A,\"100,000.00\",\"10,000.00\",\"90,000.00\",\"5,000.00\""));
        assert_eq!(
            lines[3],
            "Total Flujo Mensual,,,,,\"15,000.00\",\"15,000.00\",0.00,\"270,000.00\""
        );
    }
}
