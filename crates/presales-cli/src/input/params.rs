use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::input::file;

/// Calculation parameters read from a `--params` file.
///
/// Every field is optional; command-line flags override file values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParamsFile {
    pub absorption: Option<i64>,
    pub reserve_pct: Option<Decimal>,
    pub disbursement_pct: Option<Decimal>,
    pub reserve_months: Option<i64>,
    pub lag_months: Option<i64>,
    /// Effective annual discount rate as a decimal (0.10 = 10%)
    pub discount_rate: Option<Decimal>,
}

impl ParamsFile {
    /// Load from `.toml`, `.yaml`/`.yml` or `.json`, chosen by extension.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let (canonical, contents) = file::read_text(path)?;
        let params = Self::parse(&file::extension(&canonical), &contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
        info!(path = %canonical.display(), "Loaded parameters file");
        Ok(params)
    }

    pub fn parse(format: &str, contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let params = match format {
            "toml" => toml::from_str(contents)?,
            "yaml" | "yml" => serde_yaml::from_str(contents)?,
            "json" => serde_json::from_str(contents)?,
            other => {
                return Err(format!(
                    "Unsupported parameters format '.{other}' (expected .toml, .yaml or .json)"
                )
                .into())
            }
        };
        Ok(params)
    }
}
