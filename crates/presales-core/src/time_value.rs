use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PresalesError;
use crate::types::{Money, Rate};
use crate::PresalesResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Discounted value of a table's monthly totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentValue {
    pub annual_rate: Rate,
    pub monthly_rate: Rate,
    /// Sum of monthly totals with no discounting
    pub undiscounted_total: Money,
    /// Month 1 is the valuation date (period 0)
    pub present_value: Money,
}

/// Net Present Value of a series of cash flows; the first flow is undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> PresalesResult<Money> {
    if rate <= dec!(-1) {
        return Err(PresalesError::invalid_parameter(
            "rate",
            "Discount rate must be greater than -100%",
        ));
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r).ok_or_else(|| {
                PresalesError::invalid_parameter(
                    "rate",
                    format!("Discount factor overflowed at period {t}"),
                )
            })?;
        }
        if discount.is_zero() {
            return Err(PresalesError::invalid_parameter(
                "rate",
                format!("Discount factor vanished at period {t}"),
            ));
        }
        result = cf
            .checked_div(discount)
            .and_then(|pv| result.checked_add(pv))
            .ok_or_else(|| {
                PresalesError::invalid_parameter(
                    "rate",
                    format!("Present value overflowed at period {t}"),
                )
            })?;
    }

    Ok(result)
}

/// Effective monthly rate equivalent to an effective annual rate.
pub fn monthly_rate(annual_rate: Rate) -> PresalesResult<Rate> {
    if annual_rate <= dec!(-1) {
        return Err(PresalesError::invalid_parameter(
            "annual_rate",
            "Annual discount rate must be greater than -100%",
        ));
    }
    if annual_rate.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let exponent = Decimal::ONE / MONTHS_PER_YEAR;
    Ok((Decimal::ONE + annual_rate).powd(exponent) - Decimal::ONE)
}

/// Discount a monthly totals series at an effective annual rate.
pub fn present_value(monthly_totals: &[Money], annual_rate: Rate) -> PresalesResult<PresentValue> {
    let monthly = monthly_rate(annual_rate)?;
    let undiscounted_total = monthly_totals
        .iter()
        .try_fold(Decimal::ZERO, |acc, m| acc.checked_add(*m))
        .ok_or_else(|| {
            PresalesError::invalid_parameter("monthly_totals", "Undiscounted total is out of range")
        })?;
    Ok(PresentValue {
        annual_rate,
        monthly_rate: monthly,
        undiscounted_total,
        present_value: npv(monthly, monthly_totals)?,
    })
}
