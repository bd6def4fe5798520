use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use presales_core::allocation::sale_month::{allocate, Allocation};
use presales_core::allocation::units::{units_from_records, Unit, UnitRecord};
use presales_core::cash_flow::builder::{build, compute_cash_flow, CashFlowInput};
use presales_core::cash_flow::schedule::PaymentTerms;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct AllocateRequest {
    units: Vec<Unit>,
    absorption: i64,
}

#[derive(Deserialize)]
struct BuildRequest {
    allocations: Vec<Allocation>,
    #[serde(flatten)]
    terms: PaymentTerms,
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

#[napi]
pub fn allocate_units(input_json: String) -> NapiResult<String> {
    let request: AllocateRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = allocate(&request.units, request.absorption).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Validate raw `{unit, price}` records (prices may be currency-formatted).
#[napi]
pub fn parse_unit_records(input_json: String) -> NapiResult<String> {
    let records: Vec<UnitRecord> = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let units = units_from_records(records).map_err(to_napi_error)?;
    serde_json::to_string(&units).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Cash flow
// ---------------------------------------------------------------------------

#[napi]
pub fn build_cash_flow(input_json: String) -> NapiResult<String> {
    let request: BuildRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let table = build(&request.allocations, &request.terms).map_err(to_napi_error)?;
    serde_json::to_string(&table).map_err(to_napi_error)
}

#[napi]
pub fn compute_cash_flow_table(input_json: String) -> NapiResult<String> {
    let input: CashFlowInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = compute_cash_flow(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn cash_flow_tabular(input_json: String) -> NapiResult<String> {
    let input: CashFlowInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = compute_cash_flow(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output.result.to_tabular()).map_err(to_napi_error)
}
