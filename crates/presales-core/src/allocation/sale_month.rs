use serde::{Deserialize, Serialize};

use crate::allocation::units::{validate_unit, Unit};
use crate::error::PresalesError;
use crate::types::Money;
use crate::PresalesResult;

/// A unit together with the month in which it is assumed to sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub unit: String,
    pub price: Money,
    /// 1-based sale month
    pub sale_month: u32,
}

/// Assign every unit a sale month, selling `absorption` units per month.
///
/// Units at positions `0..absorption` sell in month 1, the next
/// `absorption` units in month 2, and so on. Input order is preserved.
pub fn allocate(units: &[Unit], absorption: i64) -> PresalesResult<Vec<Allocation>> {
    validate_absorption(absorption)?;

    let mut allocations = Vec::with_capacity(units.len());
    let mut month: u32 = 1;
    for (i, unit) in units.iter().enumerate() {
        validate_unit(i, unit)?;
        if i != 0 && (i as i64) % absorption == 0 {
            month += 1;
        }
        allocations.push(Allocation {
            unit: unit.unit.clone(),
            price: unit.price,
            sale_month: month,
        });
    }

    Ok(allocations)
}

pub(crate) fn validate_absorption(absorption: i64) -> PresalesResult<()> {
    if absorption < 1 {
        return Err(PresalesError::invalid_parameter(
            "absorption",
            format!("Absorption must be at least 1 unit per month, got {absorption}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn units(n: usize) -> Vec<Unit> {
        (0..n)
            .map(|i| Unit::new(format!("U-{i}"), Decimal::from(100 * (i as i64 + 1))))
            .collect()
    }

    fn months(allocs: &[Allocation]) -> Vec<u32> {
        allocs.iter().map(|a| a.sale_month).collect()
    }

    #[test]
    fn test_absorption_one_unit_per_month() {
        let result = allocate(&units(4), 1).unwrap();
        assert_eq!(months(&result), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_absorption_groups_units() {
        let result = allocate(&units(7), 3).unwrap();
        assert_eq!(months(&result), vec![1, 1, 1, 2, 2, 2, 3]);
    }

    #[test]
    fn test_absorption_larger_than_batch() {
        let result = allocate(&units(3), 10).unwrap();
        assert_eq!(months(&result), vec![1, 1, 1]);
    }

    #[test]
    fn test_preserves_order_and_prices() {
        let input = units(5);
        let result = allocate(&input, 2).unwrap();
        assert_eq!(result.len(), input.len());
        for (a, u) in result.iter().zip(&input) {
            assert_eq!(a.unit, u.unit);
            assert_eq!(a.price, u.price);
        }
        assert_eq!(result[4].price, dec!(500));
    }

    #[test]
    fn test_month_step_property() {
        for absorption in 1..=6i64 {
            for n in 0..20usize {
                let result = allocate(&units(n), absorption).unwrap();
                assert_eq!(result.len(), n);
                for (i, a) in result.iter().enumerate() {
                    assert_eq!(a.sale_month as i64, i as i64 / absorption + 1);
                }
                for pair in result.windows(2) {
                    let step = pair[1].sale_month - pair[0].sale_month;
                    assert!(step <= 1);
                }
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(allocate(&[], 2).unwrap().is_empty());
    }

    #[test]
    fn test_zero_absorption_error() {
        let err = allocate(&units(2), 0).unwrap_err();
        match err {
            PresalesError::InvalidParameter { field, .. } => assert_eq!(field, "absorption"),
            other => panic!("Expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_absorption_error() {
        assert!(allocate(&units(2), -3).is_err());
    }

    #[test]
    fn test_invalid_parameter_wins_over_bad_unit() {
        let bad = vec![Unit::new("", dec!(100))];
        assert!(matches!(
            allocate(&bad, 0),
            Err(PresalesError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_negative_price_aborts_batch() {
        let mut input = units(3);
        input[2].price = dec!(-1);
        let err = allocate(&input, 1).unwrap_err();
        assert!(matches!(err, PresalesError::MalformedInput { index: 2, .. }));
    }
}
