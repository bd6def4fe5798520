use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::allocation::sale_month::{allocate, validate_absorption, Allocation};
use crate::allocation::units::{validate_unit_fields, Unit};
use crate::cash_flow::schedule::{terms_warnings, validate_terms, PaymentSchedule, PaymentTerms};
use crate::cash_flow::table::CashFlowTable;
use crate::types::{with_metadata, ComputationOutput};
use crate::PresalesResult;

/// Everything needed to compute a pipeline's cash flow in one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowInput {
    /// Units in sales order
    pub units: Vec<Unit>,
    /// Units sold per month
    pub absorption: i64,
    #[serde(flatten)]
    pub terms: PaymentTerms,
}

/// Build the cash-flow table from already-allocated units.
///
/// Terms are validated before any schedule is generated; a single bad
/// allocation aborts the whole batch.
pub fn build(allocations: &[Allocation], terms: &PaymentTerms) -> PresalesResult<CashFlowTable> {
    validate_terms(terms)?;

    let schedules = allocations
        .iter()
        .enumerate()
        .map(|(i, a)| {
            validate_unit_fields(i, &a.unit, a.price)?;
            PaymentSchedule::from_valid_terms(a, terms)
        })
        .collect::<PresalesResult<Vec<_>>>()?;

    CashFlowTable::from_schedules(&schedules)
}

/// Allocate sale months and build the cash-flow table in one pass.
pub fn compute_cash_flow(
    input: &CashFlowInput,
) -> PresalesResult<ComputationOutput<CashFlowTable>> {
    let start = Instant::now();

    validate_absorption(input.absorption)?;
    validate_terms(&input.terms)?;

    let mut warnings = terms_warnings(&input.terms);
    if input.units.is_empty() {
        warnings.push("No units supplied; the table holds only the total row".into());
    }

    let allocations = allocate(&input.units, input.absorption)?;
    let table = build(&allocations, &input.terms)?;

    let zero_priced = input
        .units
        .iter()
        .filter(|u| u.price == Decimal::ZERO)
        .count();
    if zero_priced > 0 {
        warnings.push(format!("{zero_priced} unit(s) have a zero price"));
    }

    let assumptions = serde_json::json!({
        "absorption": input.absorption,
        "reserve_pct": input.terms.reserve_pct.to_string(),
        "disbursement_pct": input.terms.disbursement_pct.to_string(),
        "reserve_months": input.terms.reserve_months,
        "lag_months": input.terms.lag_months,
        "unit_count": input.units.len(),
        "sale_months": allocations.last().map(|a| a.sale_month).unwrap_or(0),
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Absorption-based sale months; equal monthly reserve installments from the sale month, \
         lump-sum disbursement after reserve period plus lag",
        &assumptions,
        warnings,
        elapsed,
        table,
    ))
}
