use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::interest::{InterestFrequency, RateSchedule};
use crate::loan::Loan;
use crate::payments::PaymentPlan;
use crate::types::{ComponentMode, PaymentFrequency};

/// construction input for a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanConfig {
    pub start_date: NaiveDate,
    pub initial_value: Money,
    #[serde(default)]
    pub payment: PaymentPlan,
    /// zero means derive from initial value and payment
    #[serde(default)]
    pub n_payments: usize,
    #[serde(default)]
    pub fixed_payments: bool,
    #[serde(default)]
    pub payment_frequency: Option<PaymentFrequency>,
    #[serde(default)]
    pub payment_dates: Option<Vec<NaiveDate>>,
    #[serde(default)]
    pub interest_rate: RateSchedule,
    #[serde(default)]
    pub interest_frequency: InterestFrequency,
    #[serde(default)]
    pub additional_payment: BTreeMap<NaiveDate, Money>,
    #[serde(default)]
    pub component_mode: ComponentMode,
}

impl LoanConfig {
    /// bare configuration; a cadence or payment dates must still be set
    pub fn new(start_date: NaiveDate, initial_value: Money) -> Self {
        Self {
            start_date,
            initial_value,
            payment: PaymentPlan::default(),
            n_payments: 0,
            fixed_payments: false,
            payment_frequency: None,
            payment_dates: None,
            interest_rate: RateSchedule::default(),
            interest_frequency: InterestFrequency::Annual,
            additional_payment: BTreeMap::new(),
            component_mode: ComponentMode::default(),
        }
    }

    /// level payment on a cadence, installment count derived from the payment size
    pub fn level(
        start_date: NaiveDate,
        initial_value: Money,
        frequency: PaymentFrequency,
        payment: Money,
        rate: Rate,
    ) -> Self {
        Self {
            payment: PaymentPlan::Level(payment),
            payment_frequency: Some(frequency),
            interest_rate: RateSchedule::Flat(rate),
            ..Self::new(start_date, initial_value)
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// one loan per initial value, every other term unchanged
    pub fn scenarios(&self, initial_values: &[Money]) -> Result<Vec<Loan>> {
        initial_values
            .iter()
            .map(|initial_value| {
                Loan::new(LoanConfig {
                    initial_value: *initial_value,
                    ..self.clone()
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LoanError;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_json_minimal() {
        let config = LoanConfig::from_json(
            r#"{
                "start_date": "2023-09-01",
                "initial_value": "179596",
                "payment": "5012.57",
                "payment_frequency": "quarterly",
                "interest_rate": "0.07"
            }"#,
        )
        .unwrap();

        let expected = LoanConfig::level(
            date(2023, 9, 1),
            Money::from_major(179_596),
            PaymentFrequency::Quarterly,
            Money::from_str_exact("5012.57").unwrap(),
            Rate::from_percentage(7),
        );
        assert_eq!(config, expected);
    }

    #[test]
    fn test_from_json_full() {
        let config = LoanConfig::from_json(
            r#"{
                "start_date": "2024-01-01",
                "initial_value": "1000",
                "payment": ["400", "400", "200"],
                "payment_dates": ["2024-02-01", "2024-03-01", "2024-04-01"],
                "fixed_payments": true,
                "interest_rate": ["0.05", "0.06"],
                "interest_frequency": "monthly",
                "additional_payment": { "2024-02-15": "100" },
                "component_mode": "legacy"
            }"#,
        )
        .unwrap();

        assert!(config.fixed_payments);
        assert_eq!(config.payment_frequency, None);
        assert_eq!(config.payment_dates.as_ref().map(Vec::len), Some(3));
        assert_eq!(config.interest_frequency, InterestFrequency::Monthly);
        assert_eq!(config.component_mode, ComponentMode::Legacy);
        assert_eq!(
            config.additional_payment.get(&date(2024, 2, 15)),
            Some(&Money::from_major(100))
        );
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            LoanConfig::from_json("{\"start_date\": 5}"),
            Err(LoanError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_additional_payments() {
        let mut config = LoanConfig::level(
            date(2024, 1, 1),
            Money::from_major(12_000),
            PaymentFrequency::Monthly,
            Money::from_major(1_000),
            Rate::from_percentage(5),
        );
        config.additional_payment.insert(date(2024, 6, 15), Money::from_major(2_500));

        let json = config.to_json_pretty().unwrap();
        assert_eq!(LoanConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_scenarios_rederive_installments() {
        let config = LoanConfig::level(
            date(2024, 1, 1),
            Money::from_major(12_000),
            PaymentFrequency::Monthly,
            Money::from_major(1_000),
            Rate::ZERO,
        );

        let loans = config
            .scenarios(&[Money::from_major(6_000), Money::from_major(12_000), Money::from_major(12_500)])
            .unwrap();

        let counts: Vec<usize> = loans.iter().map(Loan::n_payments).collect();
        assert_eq!(counts, vec![6, 12, 13]);
    }
}
