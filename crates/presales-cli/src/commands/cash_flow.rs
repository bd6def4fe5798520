use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{info, warn};

use presales_core::cash_flow::builder::{compute_cash_flow, CashFlowInput};
use presales_core::cash_flow::schedule::PaymentTerms;
use presales_core::time_value;

use crate::commands::allocation::load_units;
use crate::input;
use crate::input::params::ParamsFile;
use crate::output::export;

/// Arguments for the cash-flow table
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CashFlowArgs {
    /// Path to the unit list (.csv with unit,price header, or .json)
    #[arg(long)]
    pub units: Option<String>,

    /// Path to a full JSON input (units plus parameters)
    #[arg(long)]
    pub input: Option<String>,

    /// Parameters file (.toml, .yaml or .json); flags override it
    #[arg(long)]
    pub params: Option<String>,

    /// Units sold per month
    #[arg(long)]
    pub absorption: Option<i64>,

    /// Reservation deposit as a percentage of price (e.g. 10 for 10%)
    #[arg(long)]
    pub reserve_pct: Option<Decimal>,

    /// Final disbursement as a percentage of price (e.g. 90 for 90%)
    #[arg(long)]
    pub disbursement_pct: Option<Decimal>,

    /// Number of monthly reservation installments
    #[arg(long)]
    pub reserve_months: Option<i64>,

    /// Months between the reserve period and the disbursement
    #[arg(long)]
    pub lag_months: Option<i64>,

    /// Effective annual discount rate for the present value (e.g. 0.10)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Write the table as a spreadsheet-ready CSV to this path
    #[arg(long)]
    pub export: Option<String>,
}

pub fn run_cash_flow(args: CashFlowArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = merged_params(&args)?;
    let cf_input = resolve_input(&args, &params)?;

    let output = compute_cash_flow(&cf_input)?;
    for w in &output.warnings {
        warn!("{w}");
    }
    info!(
        units = output.result.rows.len(),
        months = output.result.month_count,
        grand_total = %output.result.grand_total(),
        "Cash-flow table built"
    );

    if let Some(ref path) = args.export {
        export::write_spreadsheet(path, &output.result)?;
        info!(path = %path, "Spreadsheet written");
    }

    let present_value = params
        .discount_rate
        .map(|rate| time_value::present_value(&output.result.total.monthly, rate))
        .transpose()?;

    let mut value = serde_json::to_value(&output)?;
    if let (Some(pv), Value::Object(map)) = (present_value, &mut value) {
        map.insert("present_value".into(), serde_json::to_value(pv)?);
    }
    Ok(value)
}

/// Parameters file values with command-line flags layered on top.
fn merged_params(args: &CashFlowArgs) -> Result<ParamsFile, Box<dyn std::error::Error>> {
    let file = match args.params {
        Some(ref path) => ParamsFile::load(path)?,
        None => ParamsFile::default(),
    };
    Ok(ParamsFile {
        absorption: args.absorption.or(file.absorption),
        reserve_pct: args.reserve_pct.or(file.reserve_pct),
        disbursement_pct: args.disbursement_pct.or(file.disbursement_pct),
        reserve_months: args.reserve_months.or(file.reserve_months),
        lag_months: args.lag_months.or(file.lag_months),
        discount_rate: args.discount_rate.or(file.discount_rate),
    })
}

fn resolve_input(
    args: &CashFlowArgs,
    params: &ParamsFile,
) -> Result<CashFlowInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        let mut full: CashFlowInput = input::file::read_json(path)?;
        apply_overrides(&mut full, params);
        return Ok(full);
    }

    let units = if args.units.is_some() {
        load_units(args.units.as_deref())?
    } else {
        match input::stdin::read_stdin()? {
            Some(text) if input::stdin::looks_like_json(&text) => {
                let value: Value = serde_json::from_str(&text)?;
                if value.get("absorption").is_some() {
                    let mut full: CashFlowInput = serde_json::from_value(value)?;
                    apply_overrides(&mut full, params);
                    return Ok(full);
                }
                input::units::parse_units_json(&text)?
            }
            Some(text) => input::units::parse_units_csv(&text)?,
            None => {
                return Err(
                    "--units <file>, --input <file.json> or a piped unit list is required".into(),
                )
            }
        }
    };

    Ok(CashFlowInput {
        units,
        absorption: params
            .absorption
            .ok_or("--absorption is required (or provide --params)")?,
        terms: PaymentTerms {
            reserve_pct: params
                .reserve_pct
                .ok_or("--reserve-pct is required (or provide --params)")?,
            disbursement_pct: params
                .disbursement_pct
                .ok_or("--disbursement-pct is required (or provide --params)")?,
            reserve_months: params
                .reserve_months
                .ok_or("--reserve-months is required (or provide --params)")?,
            lag_months: params
                .lag_months
                .ok_or("--lag-months is required (or provide --params)")?,
        },
    })
}

/// Explicit parameters win over those embedded in a full JSON input.
fn apply_overrides(full: &mut CashFlowInput, params: &ParamsFile) {
    if let Some(a) = params.absorption {
        full.absorption = a;
    }
    if let Some(p) = params.reserve_pct {
        full.terms.reserve_pct = p;
    }
    if let Some(p) = params.disbursement_pct {
        full.terms.disbursement_pct = p;
    }
    if let Some(m) = params.reserve_months {
        full.terms.reserve_months = m;
    }
    if let Some(m) = params.lag_months {
        full.terms.lag_months = m;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presales_core::allocation::units::Unit;
    use rust_decimal_macros::dec;

    fn full_input() -> CashFlowInput {
        CashFlowInput {
            units: vec![Unit::new("A", dec!(100))],
            absorption: 1,
            terms: PaymentTerms {
                reserve_pct: dec!(10),
                disbursement_pct: dec!(90),
                reserve_months: 2,
                lag_months: 1,
            },
        }
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let mut input = full_input();
        let params = ParamsFile {
            absorption: Some(5),
            lag_months: Some(0),
            ..ParamsFile::default()
        };
        apply_overrides(&mut input, &params);
        assert_eq!(input.absorption, 5);
        assert_eq!(input.terms.lag_months, 0);
        assert_eq!(input.terms.reserve_months, 2);
        assert_eq!(input.terms.reserve_pct, dec!(10));
    }

    #[test]
    fn test_no_overrides_is_identity() {
        let mut input = full_input();
        apply_overrides(&mut input, &ParamsFile::default());
        assert_eq!(input.absorption, 1);
        assert_eq!(input.terms, full_input().terms);
    }
}
