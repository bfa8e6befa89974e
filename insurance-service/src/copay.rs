// Split of a remaining balance between patient and insurer
use crate::error::{InsuranceError, InsuranceResult};
use crate::models::InsurancePolicy;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoPaySplit {
    pub remaining_balance: Decimal,
    pub patient_portion: Decimal,
    pub insurer_portion: Decimal,
}

/// `patient = pct / 100 * remaining` rounded to cents; the insurer takes the
/// rest, so the two portions always add back to `remaining`.
pub fn compute_co_pay(co_pay_percent: Decimal, remaining: Decimal) -> InsuranceResult<CoPaySplit> {
    if co_pay_percent < Decimal::ZERO || co_pay_percent > Decimal::ONE_HUNDRED {
        return Err(InsuranceError::InvalidCoPay(co_pay_percent));
    }
    if remaining < Decimal::ZERO {
        return Err(InsuranceError::InvalidAmount(remaining));
    }

    let patient_portion = remaining
        .checked_mul(co_pay_percent)
        .ok_or(InsuranceError::InvalidAmount(remaining))?
        / Decimal::ONE_HUNDRED;
    let patient_portion = patient_portion
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .min(remaining);

    Ok(CoPaySplit {
        remaining_balance: remaining,
        patient_portion,
        insurer_portion: remaining - patient_portion,
    })
}

impl InsurancePolicy {
    pub fn co_pay(&self, remaining: Decimal) -> InsuranceResult<CoPaySplit> {
        compute_co_pay(self.co_pay_percent, remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_amount_beyond_decimal_range_is_rejected() {
        let result = compute_co_pay(Decimal::from(20), Decimal::MAX);
        assert!(matches!(result, Err(InsuranceError::InvalidAmount(_))));
    }

    #[test]
    fn test_twenty_percent_of_eight_hundred() {
        let split = compute_co_pay(dec("20"), dec("800")).unwrap();
        assert_eq!(split.patient_portion, dec("160"));
        assert_eq!(split.insurer_portion, dec("640"));
    }

    #[test]
    fn test_bounds() {
        let none = compute_co_pay(Decimal::ZERO, dec("250.40")).unwrap();
        assert_eq!(none.patient_portion, Decimal::ZERO);
        assert_eq!(none.insurer_portion, dec("250.40"));

        let all = compute_co_pay(Decimal::ONE_HUNDRED, dec("250.40")).unwrap();
        assert_eq!(all.patient_portion, dec("250.40"));
        assert_eq!(all.insurer_portion, Decimal::ZERO);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        // 12.5% of 0.20 = 0.025
        let split = compute_co_pay(dec("12.5"), dec("0.20")).unwrap();
        assert_eq!(split.patient_portion, dec("0.03"));
        assert_eq!(split.insurer_portion, dec("0.17"));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            compute_co_pay(dec("100.01"), dec("10")),
            Err(InsuranceError::InvalidCoPay(_))
        ));
        assert!(matches!(
            compute_co_pay(dec("-1"), dec("10")),
            Err(InsuranceError::InvalidCoPay(_))
        ));
        assert!(matches!(
            compute_co_pay(dec("10"), dec("-0.01")),
            Err(InsuranceError::InvalidAmount(_))
        ));
    }

    proptest! {
        #[test]
        fn portions_sum_to_remaining(pct_bp in 0u32..=10_000, cents in 0i64..10_000_000_000) {
            let pct = Decimal::new(i64::from(pct_bp), 2);
            let remaining = Decimal::new(cents, 2);
            let split = compute_co_pay(pct, remaining).unwrap();
            prop_assert_eq!(split.patient_portion + split.insurer_portion, remaining);
            prop_assert!(split.patient_portion >= Decimal::ZERO);
            prop_assert!(split.insurer_portion >= Decimal::ZERO);
        }

        #[test]
        fn patient_share_grows_with_percent(a in 0u32..=100, b in 0u32..=100, cents in 0i64..1_000_000_000) {
            let remaining = Decimal::new(cents, 2);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let low = compute_co_pay(Decimal::from(lo), remaining).unwrap();
            let high = compute_co_pay(Decimal::from(hi), remaining).unwrap();
            prop_assert!(low.patient_portion <= high.patient_portion);
        }
    }
}
