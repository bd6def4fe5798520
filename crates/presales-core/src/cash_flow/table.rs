use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cash_flow::schedule::PaymentSchedule;
use crate::error::PresalesError;
use crate::types::Money;
use crate::PresalesResult;

/// Label of the synthetic row holding the column-wise monthly sums.
pub const TOTAL_ROW_LABEL: &str = "Total Flujo Mensual";

/// Leading non-month columns, in output order.
pub const FIXED_COLUMNS: [&str; 5] = [
    "unit",
    "price",
    "reserve",
    "disbursement",
    "monthly_reserve_installment",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One unit's line in the cash-flow table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowRow {
    pub unit: String,
    pub price: Money,
    pub reserve_total: Money,
    pub disbursement_total: Money,
    pub monthly_reserve_installment: Money,
    pub sale_month: u32,
    pub disbursement_month: u32,
    /// `monthly[m - 1]` is the amount collected in month `m`
    pub monthly: Vec<Money>,
}

/// Trailing row: per-month sums over every unit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalRow {
    pub label: String,
    pub monthly: Vec<Money>,
}

/// Month-by-month cash-flow table for the whole pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowTable {
    /// Number of month columns (months `1..=month_count`)
    pub month_count: u32,
    pub rows: Vec<CashFlowRow>,
    pub total: TotalRow,
}

/// A single point of the monthly totals series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: u32,
    pub label: String,
    pub amount: Money,
}

/// A cell of the generic tabular view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Text(String),
    Amount(Money),
    Blank,
}

/// Generic table: ordered named columns and ordered rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tabular {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Column name of month `m`.
pub fn month_label(month: u32) -> String {
    format!("month {month}")
}

impl CashFlowTable {
    /// Merge per-unit schedules into one table aligned on month index.
    ///
    /// Fails if a monthly total or the grand total exceeds `Decimal::MAX`.
    pub fn from_schedules(schedules: &[PaymentSchedule]) -> PresalesResult<Self> {
        let month_count = schedules
            .iter()
            .map(PaymentSchedule::last_month)
            .max()
            .unwrap_or(0);

        let rows: Vec<CashFlowRow> = schedules
            .iter()
            .map(|s| {
                let mut monthly = vec![Decimal::ZERO; month_count as usize];
                let start = s.sale_month.saturating_sub(1) as usize;
                for (slot, amount) in monthly.iter_mut().skip(start).zip(&s.payments) {
                    *slot = *amount;
                }
                CashFlowRow {
                    unit: s.unit.clone(),
                    price: s.price,
                    reserve_total: s.reserve_total,
                    disbursement_total: s.disbursement_total,
                    monthly_reserve_installment: s.monthly_reserve_installment,
                    sale_month: s.sale_month,
                    disbursement_month: s.disbursement_month,
                    monthly,
                }
            })
            .collect();

        let mut table = CashFlowTable {
            month_count,
            rows,
            total: TotalRow {
                label: TOTAL_ROW_LABEL.to_string(),
                monthly: Vec::new(),
            },
        };
        table.total.monthly = table.recompute_totals()?;
        table
            .total
            .monthly
            .iter()
            .try_fold(Decimal::ZERO, |acc, m| acc.checked_add(*m))
            .ok_or_else(|| {
                PresalesError::invalid_parameter(
                    "price",
                    "Grand total of the pipeline is out of range",
                )
            })?;
        Ok(table)
    }

    /// Sum every month column over the unit rows.
    pub fn recompute_totals(&self) -> PresalesResult<Vec<Money>> {
        let mut totals = vec![Decimal::ZERO; self.month_count as usize];
        for row in &self.rows {
            for (m, (total, amount)) in totals.iter_mut().zip(&row.monthly).enumerate() {
                *total = total.checked_add(*amount).ok_or_else(|| {
                    PresalesError::invalid_parameter(
                        "price",
                        format!("Total for {} is out of range", month_label(m as u32 + 1)),
                    )
                })?;
            }
        }
        Ok(totals)
    }

    /// Monthly totals as a labelled series, e.g. for charting.
    pub fn monthly_totals(&self) -> Vec<MonthlyTotal> {
        self.total
            .monthly
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                let month = i as u32 + 1;
                MonthlyTotal {
                    month,
                    label: month_label(month),
                    amount: *amount,
                }
            })
            .collect()
    }

    /// Everything collected over the whole horizon.
    ///
    /// Tables built by [`CashFlowTable::from_schedules`] never saturate.
    pub fn grand_total(&self) -> Money {
        self.total
            .monthly
            .iter()
            .fold(Decimal::ZERO, |acc, m| acc.saturating_add(*m))
    }

    /// Column names: fixed columns followed by one per month.
    pub fn columns(&self) -> Vec<String> {
        FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain((1..=self.month_count).map(month_label))
            .collect()
    }

    /// Flatten into the generic column/row view, total row last.
    ///
    /// Non-month cells of the total row are blank, not zero.
    pub fn to_tabular(&self) -> Tabular {
        let mut rows: Vec<Vec<Cell>> = self
            .rows
            .iter()
            .map(|r| {
                let mut cells = vec![
                    Cell::Text(r.unit.clone()),
                    Cell::Amount(r.price),
                    Cell::Amount(r.reserve_total),
                    Cell::Amount(r.disbursement_total),
                    Cell::Amount(r.monthly_reserve_installment),
                ];
                cells.extend(r.monthly.iter().map(|a| Cell::Amount(*a)));
                cells
            })
            .collect();

        let mut total = vec![
            Cell::Text(self.total.label.clone()),
            Cell::Blank,
            Cell::Blank,
            Cell::Blank,
            Cell::Blank,
        ];
        total.extend(self.total.monthly.iter().map(|a| Cell::Amount(*a)));
        rows.push(total);

        Tabular {
            columns: self.columns(),
            rows,
        }
    }
}
