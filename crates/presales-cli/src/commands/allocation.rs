use clap::Args;
use serde_json::Value;
use tracing::info;

use presales_core::allocation::sale_month::allocate;
use presales_core::allocation::units::Unit;

use crate::input;

/// Arguments for sale-month allocation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AllocateArgs {
    /// Path to the unit list (.csv with unit,price header, or .json)
    #[arg(long)]
    pub units: Option<String>,

    /// Units sold per month
    #[arg(long)]
    pub absorption: i64,
}

pub fn run_allocate(args: AllocateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let units = load_units(args.units.as_deref())?;
    let allocations = allocate(&units, args.absorption)?;
    info!(
        units = allocations.len(),
        months = allocations.last().map(|a| a.sale_month).unwrap_or(0),
        "Allocated sale months"
    );
    Ok(serde_json::to_value(allocations)?)
}

/// Units from `--units`, or from piped stdin when no path is given.
pub fn load_units(path: Option<&str>) -> Result<Vec<Unit>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return input::units::read_units(path);
    }
    match input::stdin::read_stdin()? {
        Some(text) if input::stdin::looks_like_json(&text) => {
            input::units::parse_units_json(&text)
        }
        Some(text) => input::units::parse_units_csv(&text),
        None => Err("--units <file.csv|file.json> or piped unit list required".into()),
    }
}
