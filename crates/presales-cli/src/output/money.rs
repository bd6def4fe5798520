use num_format::{Locale, ToFormattedString as _};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount as `#,##0.00` (en locale, no currency symbol).
///
/// Halves round away from zero, as spreadsheet number formats display them.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = rounded.abs();
    let integer_part = abs.trunc();
    let cents = ((abs - integer_part) * Decimal::ONE_HUNDRED)
        .round()
        .to_u32()
        .unwrap_or(0);
    let grouped = match integer_part.to_u64() {
        Some(n) => n.to_formatted_string(&Locale::en),
        None => integer_part.to_string(),
    };
    format!("{sign}{grouped}.{cents:02}")
}
