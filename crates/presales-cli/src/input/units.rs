use serde_json::Value;
use tracing::{debug, info};

use presales_core::allocation::units::{units_from_records, Unit, UnitRecord};

use crate::input::file;

/// Load an ordered unit list from a `.csv` or `.json` file.
pub fn read_units(path: &str) -> Result<Vec<Unit>, Box<dyn std::error::Error>> {
    let (canonical, contents) = file::read_text(path)?;
    let units = match file::extension(&canonical).as_str() {
        "json" => parse_units_json(&contents)?,
        "csv" | "txt" | "" => parse_units_csv(&contents)?,
        other => {
            return Err(format!(
                "Unsupported unit list format '.{other}' (expected .csv or .json)"
            )
            .into())
        }
    };
    info!(path = %canonical.display(), units = units.len(), "Loaded unit list");
    Ok(units)
}

/// Parse a CSV unit list with a `unit,price` (or `unidad,precio`) header.
///
/// Prices may carry currency symbols and thousands separators.
pub fn parse_units_csv(text: &str) -> Result<Vec<Unit>, Box<dyn std::error::Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let records = reader
        .deserialize::<UnitRecord>()
        .enumerate()
        .map(|(i, r)| r.map_err(|e| format!("Unreadable unit record {i}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(records = records.len(), "Parsed CSV unit records");

    Ok(units_from_records(records)?)
}

/// Parse a JSON array of `{"unit": .., "price": ..}` objects.
///
/// Identifiers and prices may be given as strings or numbers.
pub fn parse_units_json(text: &str) -> Result<Vec<Unit>, Box<dyn std::error::Error>> {
    let value: Value = serde_json::from_str(text)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("units") {
            Some(Value::Array(items)) => items,
            _ => return Err("JSON unit list must be an array or hold a 'units' array".into()),
        },
        _ => return Err("JSON unit list must be an array or hold a 'units' array".into()),
    };

    let records: Vec<UnitRecord> = items
        .iter()
        .map(|item| UnitRecord {
            unit: field_text(item, &["unit", "unidad"]),
            price: field_text(item, &["price", "precio"]),
        })
        .collect();

    Ok(units_from_records(records)?)
}

fn field_text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match item.get(*k)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_csv_with_formatted_prices() {
        let csv = "unit,price\nA-101,\"$150,000.00\"\nA-102,162500\n";
        let units = parse_units_csv(csv).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].unit, "A-101");
        assert_eq!(units[0].price, dec!(150000));
        assert_eq!(units[1].price, dec!(162500));
    }

    #[test]
    fn test_csv_spanish_headers() {
        let csv = "unidad,precio\n1,100\n2,200\n";
        let units = parse_units_csv(csv).unwrap();
        assert_eq!(units[1].unit, "2");
        assert_eq!(units[1].price, dec!(200));
    }

    #[test]
    fn test_csv_blank_price_rejected() {
        let csv = "unit,price\nA,100\nB,\n";
        let err = parse_units_csv(csv).unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_json_numbers_and_strings() {
        let json = r#"[{"unit": 101, "price": 100000}, {"unit": "PH", "price": "$1,000,000"}]"#;
        let units = parse_units_json(json).unwrap();
        assert_eq!(units[0].unit, "101");
        assert_eq!(units[0].price, dec!(100000));
        assert_eq!(units[1].price, dec!(1000000));
    }

    #[test]
    fn test_json_wrapped_units() {
        let json = r#"{"units": [{"unit": "A", "price": 10}]}"#;
        assert_eq!(parse_units_json(json).unwrap().len(), 1);
    }

    #[test]
    fn test_json_missing_price_rejected() {
        let json = r#"[{"unit": "A"}]"#;
        assert!(parse_units_json(json).is_err());
    }
}
