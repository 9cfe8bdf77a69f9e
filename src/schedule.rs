use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::payments::PaymentPlan;
use crate::types::PaymentFrequency;

/// where the installment dates come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSource {
    /// dates generated one period apart, starting one period after the start date
    Cadence(PaymentFrequency),
    /// caller-supplied dates, used verbatim
    Dates(Vec<NaiveDate>),
}

impl ScheduleSource {
    /// exactly one of cadence or explicit dates must be supplied
    pub fn from_parts(
        frequency: Option<PaymentFrequency>,
        dates: Option<Vec<NaiveDate>>,
    ) -> Result<Self> {
        match (frequency, dates) {
            (Some(frequency), None) => Ok(ScheduleSource::Cadence(frequency)),
            (None, Some(dates)) => Ok(ScheduleSource::Dates(dates)),
            (Some(_), Some(_)) => Err(LoanError::InvalidConfiguration {
                message: "payment frequency and payment dates cannot be specified at the same time"
                    .to_string(),
            }),
            (None, None) => Err(LoanError::InvalidConfiguration {
                message: "payment frequency or payment dates not specified".to_string(),
            }),
        }
    }
}

/// produces the ordered installment dates for a loan
pub struct ScheduleGenerator {
    start_date: NaiveDate,
    source: ScheduleSource,
}

impl ScheduleGenerator {
    pub fn new(start_date: NaiveDate, source: ScheduleSource) -> Self {
        Self { start_date, source }
    }

    /// materialise installment dates. a zero `n_payments` with a cadence is
    /// derived from the initial value and payment size.
    pub fn generate(
        &self,
        n_payments: usize,
        initial_value: Money,
        payment: &PaymentPlan,
    ) -> Result<Vec<NaiveDate>> {
        match &self.source {
            ScheduleSource::Cadence(frequency) => {
                let count = if n_payments == 0 {
                    derive_payment_count(initial_value, payment)?
                } else {
                    n_payments
                };
                cadence_dates(self.start_date, *frequency, count)
            }
            ScheduleSource::Dates(dates) => {
                validate_explicit_dates(self.start_date, dates)?;
                Ok(dates.clone())
            }
        }
    }
}

/// number of installments needed to retire `initial_value`: ceil(initial / payment)
/// for a level payment, or the shortest covering prefix of a payment sequence.
pub fn derive_payment_count(initial_value: Money, payment: &PaymentPlan) -> Result<usize> {
    if !initial_value.is_positive() {
        return Ok(0);
    }

    match payment {
        PaymentPlan::Level(amount) => {
            if !amount.is_positive() {
                return Err(LoanError::NumericDomain {
                    message: format!("payment must be positive to derive installment count, got {}", amount),
                });
            }
            (initial_value.as_decimal() / amount.as_decimal())
                .ceil()
                .to_usize()
                .ok_or_else(|| LoanError::NumericDomain {
                    message: format!(
                        "installment count for {} at {} per payment is out of range",
                        initial_value, amount
                    ),
                })
        }
        PaymentPlan::PerInstallment(amounts) => {
            let mut covered = Money::ZERO;
            for (index, amount) in amounts.iter().enumerate() {
                covered += *amount;
                if covered >= initial_value {
                    return Ok(index + 1);
                }
            }
            Err(LoanError::NumericDomain {
                message: format!(
                    "payment sequence totals {} and never covers initial value {}",
                    covered, initial_value
                ),
            })
        }
    }
}

/// start + k periods for k = 1..=count, end-of-month clamped
fn cadence_dates(start: NaiveDate, frequency: PaymentFrequency, count: usize) -> Result<Vec<NaiveDate>> {
    let period = frequency.period_months();
    (1..=count)
        .map(|k| {
            let months = u32::try_from(k)
                .ok()
                .and_then(|k| k.checked_mul(period))
                .ok_or_else(|| LoanError::InvalidDate {
                    message: format!("installment {} is too far from {}", k, start),
                })?;
            start
                .checked_add_months(Months::new(months))
                .ok_or_else(|| LoanError::InvalidDate {
                    message: format!("{} plus {} months is out of range", start, months),
                })
        })
        .collect()
}

fn validate_explicit_dates(start: NaiveDate, dates: &[NaiveDate]) -> Result<()> {
    if let Some(first) = dates.first() {
        if *first <= start {
            return Err(LoanError::InvalidConfiguration {
                message: format!("payment date {} is not after start date {}", first, start),
            });
        }
    }
    if let Some(pair) = dates.windows(2).find(|pair| pair[1] <= pair[0]) {
        return Err(LoanError::InvalidConfiguration {
            message: format!("payment dates must be strictly ascending: {} follows {}", pair[1], pair[0]),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn level(amount: i64) -> PaymentPlan {
        PaymentPlan::Level(Money::from_major(amount))
    }

    #[test]
    fn test_source_requires_exactly_one_kind() {
        assert!(matches!(
            ScheduleSource::from_parts(None, None),
            Err(LoanError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            ScheduleSource::from_parts(Some(PaymentFrequency::Monthly), Some(vec![date(2024, 1, 1)])),
            Err(LoanError::InvalidConfiguration { .. })
        ));
        assert_eq!(
            ScheduleSource::from_parts(Some(PaymentFrequency::Monthly), None).unwrap(),
            ScheduleSource::Cadence(PaymentFrequency::Monthly)
        );
    }

    #[test]
    fn test_derived_count_rounds_up() {
        let payment = PaymentPlan::Level(Money::from_decimal(dec!(5012.57)));
        let count = derive_payment_count(Money::from_major(179_596), &payment).unwrap();
        assert_eq!(count, 36);

        assert_eq!(derive_payment_count(Money::from_major(12_000), &level(1_000)).unwrap(), 12);
    }

    #[test]
    fn test_derived_count_rejects_non_positive_payment() {
        assert!(matches!(
            derive_payment_count(Money::from_major(1_000), &level(0)),
            Err(LoanError::NumericDomain { .. })
        ));
        assert!(matches!(
            derive_payment_count(Money::from_major(1_000), &level(-10)),
            Err(LoanError::NumericDomain { .. })
        ));
    }

    #[test]
    fn test_derived_count_from_sequence() {
        let payments = PaymentPlan::PerInstallment(vec![
            Money::from_major(400),
            Money::from_major(400),
            Money::from_major(400),
            Money::from_major(400),
        ]);
        assert_eq!(derive_payment_count(Money::from_major(1_000), &payments).unwrap(), 3);
        assert!(derive_payment_count(Money::from_major(5_000), &payments).is_err());
    }

    #[test]
    fn test_quarterly_cadence_starts_one_period_later() {
        let generator = ScheduleGenerator::new(
            date(2023, 9, 1),
            ScheduleSource::Cadence(PaymentFrequency::Quarterly),
        );
        let dates = generator.generate(0, Money::from_major(10_000), &level(2_500)).unwrap();
        assert_eq!(
            dates,
            vec![date(2023, 12, 1), date(2024, 3, 1), date(2024, 6, 1), date(2024, 9, 1)]
        );
    }

    #[test]
    fn test_every_cadence_spacing() {
        let start = date(2020, 1, 15);
        for frequency in [
            PaymentFrequency::Annual,
            PaymentFrequency::SemiAnnual,
            PaymentFrequency::Quarterly,
            PaymentFrequency::Monthly,
        ] {
            let generator = ScheduleGenerator::new(start, ScheduleSource::Cadence(frequency));
            let dates = generator.generate(5, Money::ZERO, &level(1)).unwrap();
            assert_eq!(dates.len(), 5);
            for (k, d) in dates.iter().enumerate() {
                let expected = start + Months::new(frequency.period_months() * (k as u32 + 1));
                assert_eq!(*d, expected);
            }
        }
    }

    #[test]
    fn test_month_end_is_clamped() {
        let generator = ScheduleGenerator::new(
            date(2024, 1, 31),
            ScheduleSource::Cadence(PaymentFrequency::Monthly),
        );
        let dates = generator.generate(3, Money::ZERO, &level(1)).unwrap();
        assert_eq!(dates, vec![date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]);
    }

    #[test]
    fn test_explicit_dates_used_verbatim() {
        let explicit = vec![date(2024, 2, 10), date(2024, 5, 3), date(2025, 1, 1)];
        let generator = ScheduleGenerator::new(date(2024, 1, 1), ScheduleSource::Dates(explicit.clone()));
        // count and payment size are ignored for explicit dates
        let dates = generator.generate(99, Money::from_major(1), &level(0)).unwrap();
        assert_eq!(dates, explicit);
    }

    #[test]
    fn test_explicit_dates_must_ascend_after_start() {
        let unordered = ScheduleGenerator::new(
            date(2024, 1, 1),
            ScheduleSource::Dates(vec![date(2024, 3, 1), date(2024, 2, 1)]),
        );
        assert!(unordered.generate(0, Money::ZERO, &level(1)).is_err());

        let early = ScheduleGenerator::new(
            date(2024, 1, 1),
            ScheduleSource::Dates(vec![date(2024, 1, 1)]),
        );
        assert!(early.generate(0, Money::ZERO, &level(1)).is_err());
    }
}
