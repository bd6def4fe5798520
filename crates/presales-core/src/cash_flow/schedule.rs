use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::allocation::sale_month::Allocation;
use crate::error::PresalesError;
use crate::types::{Money, Percent};
use crate::PresalesResult;

const HUNDRED: Decimal = dec!(100);

/// Upper bound on `reserve_months` and on `lag_months` (100 years each).
pub const MAX_TERM_MONTHS: i64 = 1200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Payment terms applied uniformly to every unit in the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTerms {
    /// Share of the price collected as reservation deposit (10 = 10%)
    pub reserve_pct: Percent,
    /// Share of the price collected as the final lump-sum disbursement
    pub disbursement_pct: Percent,
    /// Number of equal monthly reservation installments (>= 1)
    pub reserve_months: i64,
    /// Months between the last installment period and the disbursement (>= 0)
    pub lag_months: i64,
}

/// Reserve and disbursement schedule of a single unit.
///
/// `payments[k]` is the amount collected in month `sale_month + k`; the
/// array runs through the later of `disbursement_month` and the last
/// installment month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub unit: String,
    pub price: Money,
    pub sale_month: u32,
    pub disbursement_month: u32,
    /// price * reserve_pct / 100
    pub reserve_total: Money,
    /// price * disbursement_pct / 100
    pub disbursement_total: Money,
    /// reserve_total / reserve_months
    pub monthly_reserve_installment: Money,
    pub payments: Vec<Money>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reject terms that cannot produce a schedule.
pub fn validate_terms(terms: &PaymentTerms) -> PresalesResult<()> {
    if terms.reserve_pct < Decimal::ZERO {
        return Err(PresalesError::invalid_parameter(
            "reserve_pct",
            "Reserve percentage must be non-negative",
        ));
    }
    if terms.disbursement_pct < Decimal::ZERO {
        return Err(PresalesError::invalid_parameter(
            "disbursement_pct",
            "Disbursement percentage must be non-negative",
        ));
    }
    if terms.reserve_months < 1 {
        return Err(PresalesError::invalid_parameter(
            "reserve_months",
            format!(
                "Reserve must be paid over at least 1 month, got {}",
                terms.reserve_months
            ),
        ));
    }
    if terms.lag_months < 0 {
        return Err(PresalesError::invalid_parameter(
            "lag_months",
            format!(
                "Disbursement lag must be non-negative, got {}",
                terms.lag_months
            ),
        ));
    }
    if terms.reserve_months > MAX_TERM_MONTHS {
        return Err(PresalesError::invalid_parameter(
            "reserve_months",
            format!(
                "Reserve period of {} months exceeds the {MAX_TERM_MONTHS}-month limit",
                terms.reserve_months
            ),
        ));
    }
    if terms.lag_months > MAX_TERM_MONTHS {
        return Err(PresalesError::invalid_parameter(
            "lag_months",
            format!(
                "Disbursement lag of {} months exceeds the {MAX_TERM_MONTHS}-month limit",
                terms.lag_months
            ),
        ));
    }
    Ok(())
}

fn validate_sale_month(allocation: &Allocation) -> PresalesResult<()> {
    if allocation.sale_month < 1 {
        return Err(PresalesError::invalid_parameter(
            "sale_month",
            format!("Sale month of '{}' must be at least 1", allocation.unit),
        ));
    }
    Ok(())
}

/// Non-fatal observations about a set of terms.
pub fn terms_warnings(terms: &PaymentTerms) -> Vec<String> {
    let mut warnings = Vec::new();
    if terms.reserve_pct > HUNDRED {
        warnings.push(format!(
            "Reserve percentage {}% exceeds 100%",
            terms.reserve_pct
        ));
    }
    if terms.disbursement_pct > HUNDRED {
        warnings.push(format!(
            "Disbursement percentage {}% exceeds 100%",
            terms.disbursement_pct
        ));
    }
    match terms.reserve_pct.checked_add(terms.disbursement_pct) {
        Some(collected) if collected == HUNDRED => {}
        Some(collected) => warnings.push(format!(
            "Reserve and disbursement cover {collected}% of the price, not 100%"
        )),
        None => warnings.push("Reserve and disbursement percentages are out of range".into()),
    }
    warnings
}

impl PaymentSchedule {
    /// Build the schedule of one allocated unit, with the disbursement at
    /// `sale_month + reserve_months + lag_months`.
    pub fn for_allocation(
        allocation: &Allocation,
        terms: &PaymentTerms,
    ) -> PresalesResult<PaymentSchedule> {
        validate_terms(terms)?;
        Self::from_valid_terms(allocation, terms)
    }

    /// Build a schedule whose disbursement falls in an explicit month.
    ///
    /// If `disbursement_month` coincides with a reservation installment, the
    /// installment is overwritten rather than added to.
    pub fn with_disbursement_month(
        allocation: &Allocation,
        terms: &PaymentTerms,
        disbursement_month: u32,
    ) -> PresalesResult<PaymentSchedule> {
        validate_terms(terms)?;
        validate_sale_month(allocation)?;
        if disbursement_month < allocation.sale_month {
            return Err(PresalesError::invalid_parameter(
                "disbursement_month",
                format!(
                    "Disbursement month {disbursement_month} precedes sale month {}",
                    allocation.sale_month
                ),
            ));
        }
        let offset = i64::from(disbursement_month - allocation.sale_month);
        if offset > 2 * MAX_TERM_MONTHS {
            return Err(PresalesError::invalid_parameter(
                "disbursement_month",
                format!(
                    "Disbursement month {disbursement_month} is more than {} months after sale month {}",
                    2 * MAX_TERM_MONTHS,
                    allocation.sale_month
                ),
            ));
        }
        Self::build(allocation, terms, disbursement_month)
    }

    /// Caller guarantees `terms` passed [`validate_terms`].
    pub(crate) fn from_valid_terms(
        allocation: &Allocation,
        terms: &PaymentTerms,
    ) -> PresalesResult<Self> {
        validate_sale_month(allocation)?;
        // Terms are capped at MAX_TERM_MONTHS; only the sale month can overflow
        let disbursement_month = u32::try_from(terms.reserve_months + terms.lag_months)
            .ok()
            .and_then(|months| allocation.sale_month.checked_add(months))
            .ok_or_else(|| {
                PresalesError::invalid_parameter(
                    "sale_month",
                    format!(
                        "Disbursement month of '{}' sold in month {} is out of range",
                        allocation.unit, allocation.sale_month
                    ),
                )
            })?;
        Self::build(allocation, terms, disbursement_month)
    }

    fn build(
        allocation: &Allocation,
        terms: &PaymentTerms,
        disbursement_month: u32,
    ) -> PresalesResult<Self> {
        let reserve_months = terms.reserve_months as u32;

        let reserve_total = share_of_price(allocation, terms.reserve_pct)?;
        let disbursement_total = share_of_price(allocation, terms.disbursement_pct)?;
        let monthly_reserve_installment = reserve_total / Decimal::from(reserve_months);

        let offset = (disbursement_month - allocation.sale_month) as usize;
        let span = (reserve_months as usize).max(offset + 1);
        let mut payments = vec![Decimal::ZERO; span];
        for slot in payments.iter_mut().take(reserve_months as usize) {
            *slot = monthly_reserve_installment;
        }
        payments[offset] = disbursement_total;

        Ok(PaymentSchedule {
            unit: allocation.unit.clone(),
            price: allocation.price,
            sale_month: allocation.sale_month,
            disbursement_month,
            reserve_total,
            disbursement_total,
            monthly_reserve_installment,
            payments,
        })
    }

    /// Amount collected from this unit in `month` (zero outside its span).
    pub fn amount_at(&self, month: u32) -> Money {
        if month < self.sale_month {
            return Decimal::ZERO;
        }
        self.payments
            .get((month - self.sale_month) as usize)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Last month covered by this schedule.
    pub fn last_month(&self) -> u32 {
        self.sale_month
            .saturating_add(self.payments.len().saturating_sub(1) as u32)
    }

    /// Total collected over the whole schedule, saturating at `Decimal::MAX`.
    pub fn total_collected(&self) -> Money {
        self.payments
            .iter()
            .fold(Decimal::ZERO, |acc, p| acc.saturating_add(*p))
    }
}

/// `price * pct / 100`, rejecting prices too large for the percentage.
fn share_of_price(allocation: &Allocation, pct: Percent) -> PresalesResult<Money> {
    allocation
        .price
        .checked_mul(pct)
        .and_then(|amount| amount.checked_div(HUNDRED))
        .ok_or_else(|| {
            PresalesError::invalid_parameter(
                "price",
                format!(
                    "{pct}% of the price {} of '{}' is out of range",
                    allocation.price, allocation.unit
                ),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(reserve_pct: Decimal, disbursement_pct: Decimal, rm: i64, lag: i64) -> PaymentTerms {
        PaymentTerms {
            reserve_pct,
            disbursement_pct,
            reserve_months: rm,
            lag_months: lag,
        }
    }

    fn alloc(price: Decimal, sale_month: u32) -> Allocation {
        Allocation {
            unit: "A-1".into(),
            price,
            sale_month,
        }
    }

    #[test]
    fn test_reserve_and_disbursement_totals() {
        let s = PaymentSchedule::for_allocation(
            &alloc(dec!(100), 1),
            &terms(dec!(10), dec!(90), 2, 1),
        )
        .unwrap();
        assert_eq!(s.reserve_total, dec!(10));
        assert_eq!(s.disbursement_total, dec!(90));
        assert_eq!(s.monthly_reserve_installment, dec!(5));
        assert_eq!(s.disbursement_month, 4);
        assert_eq!(s.payments, vec![dec!(5), dec!(5), dec!(0), dec!(90)]);
    }

    #[test]
    fn test_schedule_starts_at_sale_month() {
        let s = PaymentSchedule::for_allocation(
            &alloc(dec!(200), 3),
            &terms(dec!(10), dec!(90), 2, 1),
        )
        .unwrap();
        assert_eq!(s.amount_at(1), dec!(0));
        assert_eq!(s.amount_at(2), dec!(0));
        assert_eq!(s.amount_at(3), dec!(10));
        assert_eq!(s.amount_at(4), dec!(10));
        assert_eq!(s.amount_at(5), dec!(0));
        assert_eq!(s.amount_at(6), dec!(180));
        assert_eq!(s.amount_at(7), dec!(0));
        assert_eq!(s.last_month(), 6);
    }

    #[test]
    fn test_single_reserve_month_no_lag() {
        let s = PaymentSchedule::for_allocation(
            &alloc(dec!(1000), 2),
            &terms(dec!(5), dec!(95), 1, 0),
        )
        .unwrap();
        assert_eq!(s.disbursement_month, 3);
        assert_eq!(s.amount_at(2), dec!(50));
        assert_eq!(s.amount_at(3), dec!(950));
    }

    #[test]
    fn test_installments_sum_to_reserve_total() {
        let s = PaymentSchedule::for_allocation(
            &alloc(dec!(100000), 1),
            &terms(dec!(10), dec!(90), 3, 2),
        )
        .unwrap();
        let installments: Decimal = s.payments[..3].iter().copied().sum();
        assert!((installments - s.reserve_total).abs() < dec!(0.0000001));
        assert!(s.payments[3..5].iter().all(|p| p.is_zero()));
    }

    #[test]
    fn test_total_collected_matches_percentages() {
        let s = PaymentSchedule::for_allocation(
            &alloc(dec!(325000), 1),
            &terms(dec!(15), dec!(80), 4, 0),
        )
        .unwrap();
        assert_eq!(
            s.reserve_total + s.disbursement_total,
            dec!(325000) * dec!(95) / dec!(100)
        );
        assert!((s.total_collected() - dec!(308750)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_collision_overwrites_installment() {
        // Disbursement forced into the second of three installment months
        let s = PaymentSchedule::with_disbursement_month(
            &alloc(dec!(100), 1),
            &terms(dec!(30), dec!(70), 3, 0),
            2,
        )
        .unwrap();
        assert_eq!(s.amount_at(1), dec!(10));
        assert_eq!(s.amount_at(2), dec!(70));
        assert_eq!(s.amount_at(3), dec!(10));
        assert_eq!(s.disbursement_month, 2);
        assert_eq!(s.last_month(), 3);
        assert_eq!(s.total_collected(), dec!(90));
    }

    #[test]
    fn test_explicit_disbursement_matches_nominal() {
        let t = terms(dec!(10), dec!(90), 2, 1);
        let nominal = PaymentSchedule::for_allocation(&alloc(dec!(100), 2), &t).unwrap();
        let explicit =
            PaymentSchedule::with_disbursement_month(&alloc(dec!(100), 2), &t, 5).unwrap();
        assert_eq!(nominal, explicit);
    }

    #[test]
    fn test_disbursement_before_sale_month_error() {
        let err = PaymentSchedule::with_disbursement_month(
            &alloc(dec!(100), 3),
            &terms(dec!(10), dec!(90), 1, 0),
            2,
        )
        .unwrap_err();
        assert!(matches!(err, PresalesError::InvalidParameter { .. }));
    }

    #[test]
    fn test_zero_price_unit() {
        let s = PaymentSchedule::for_allocation(
            &alloc(dec!(0), 1),
            &terms(dec!(10), dec!(90), 2, 1),
        )
        .unwrap();
        assert!(s.payments.iter().all(|p| p.is_zero()));
        assert_eq!(s.payments.len(), 4);
    }

    #[test]
    fn test_sale_month_zero_error() {
        let err = PaymentSchedule::for_allocation(
            &alloc(dec!(100), 0),
            &terms(dec!(10), dec!(90), 1, 0),
        )
        .unwrap_err();
        assert!(matches!(err, PresalesError::InvalidParameter { .. }));
    }

    #[test]
    fn test_zero_reserve_months_error() {
        let err = validate_terms(&terms(dec!(10), dec!(90), 0, 1)).unwrap_err();
        assert!(matches!(
            err,
            PresalesError::InvalidParameter { ref field, .. } if field == "reserve_months"
        ));
    }

    #[test]
    fn test_negative_lag_error() {
        let err = validate_terms(&terms(dec!(10), dec!(90), 3, -2)).unwrap_err();
        assert!(matches!(
            err,
            PresalesError::InvalidParameter { ref field, .. } if field == "lag_months"
        ));
    }

    #[test]
    fn test_term_months_above_limit_error() {
        let err =
            validate_terms(&terms(dec!(10), dec!(90), MAX_TERM_MONTHS + 1, 0)).unwrap_err();
        assert!(matches!(
            err,
            PresalesError::InvalidParameter { ref field, .. } if field == "reserve_months"
        ));
        let err = validate_terms(&terms(dec!(10), dec!(90), 1, u32::MAX as i64)).unwrap_err();
        assert!(matches!(
            err,
            PresalesError::InvalidParameter { ref field, .. } if field == "lag_months"
        ));
        let longest = terms(dec!(10), dec!(90), MAX_TERM_MONTHS, MAX_TERM_MONTHS);
        assert!(validate_terms(&longest).is_ok());
    }

    #[test]
    fn test_disbursement_month_past_u32_error() {
        let err = PaymentSchedule::for_allocation(
            &alloc(dec!(100), u32::MAX - 2),
            &terms(dec!(10), dec!(90), 2, 1),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PresalesError::InvalidParameter { ref field, .. } if field == "sale_month"
        ));
    }

    #[test]
    fn test_explicit_disbursement_too_far_error() {
        let err = PaymentSchedule::with_disbursement_month(
            &alloc(dec!(100), 1),
            &terms(dec!(10), dec!(90), 2, 1),
            u32::MAX,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PresalesError::InvalidParameter { ref field, .. } if field == "disbursement_month"
        ));
    }

    #[test]
    fn test_price_share_overflow_error() {
        let err = PaymentSchedule::for_allocation(
            &alloc(Decimal::from_i128_with_scale(10_i128.pow(27), 0), 1),
            &terms(dec!(100), dec!(0), 1, 0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PresalesError::InvalidParameter { ref field, .. } if field == "price"
        ));
    }

    #[test]
    fn test_out_of_range_percentages_warn() {
        let w = terms_warnings(&terms(Decimal::MAX, Decimal::MAX, 1, 0));
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn test_negative_percentages_error() {
        assert!(validate_terms(&terms(dec!(-1), dec!(90), 3, 0)).is_err());
        assert!(validate_terms(&terms(dec!(10), dec!(-0.5), 3, 0)).is_err());
    }

    #[test]
    fn test_terms_warnings() {
        assert!(terms_warnings(&terms(dec!(10), dec!(90), 2, 1)).is_empty());
        let w = terms_warnings(&terms(dec!(10), dec!(80), 2, 1));
        assert_eq!(w.len(), 1);
        assert!(w[0].contains("90%"));
        let w = terms_warnings(&terms(dec!(120), dec!(0), 2, 1));
        assert_eq!(w.len(), 2);
    }
}
