pub mod accrual;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{LoanError, Result};

pub use accrual::{actual_365_fraction, days_between};

/// period the quoted rate refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestFrequency {
    #[default]
    Annual,
    Monthly,
}

/// interest model: a quoted rate and the period it is quoted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    rate: Rate,
    frequency: InterestFrequency,
}

impl Interest {
    pub fn new(rate: Rate, frequency: InterestFrequency) -> Self {
        Self { rate, frequency }
    }

    pub fn annual(rate: Rate) -> Self {
        Self::new(rate, InterestFrequency::Annual)
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub fn frequency(&self) -> InterestFrequency {
        self.frequency
    }

    /// quoted rate expressed per annum
    pub fn annual_rate(&self) -> Rate {
        match self.frequency {
            InterestFrequency::Annual => self.rate,
            InterestFrequency::Monthly => Rate::from_decimal(self.rate.as_decimal() * dec!(12)),
        }
    }

    /// share of the annual rate accrued from `previous` to `current` (actual/365).
    /// negative when `current` precedes `previous`.
    pub fn accrual_fraction(&self, current: NaiveDate, previous: NaiveDate) -> Decimal {
        actual_365_fraction(current, previous, self.annual_rate())
    }
}

/// interest rate for a loan, flat or one entry per payment period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateSchedule {
    Flat(Rate),
    PerPeriod(Vec<Rate>),
}

impl RateSchedule {
    pub fn validate(&self) -> Result<()> {
        match self {
            RateSchedule::PerPeriod(rates) if rates.is_empty() => {
                Err(LoanError::InvalidConfiguration {
                    message: "per-period interest rate list is empty".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// rate for zero-based payment period; the last entry carries forward
    pub fn rate_for(&self, period: usize) -> Rate {
        match self {
            RateSchedule::Flat(rate) => *rate,
            RateSchedule::PerPeriod(rates) => rates
                .get(period)
                .or_else(|| rates.last())
                .copied()
                .unwrap_or(Rate::ZERO),
        }
    }

    pub fn interest_for(&self, period: usize, frequency: InterestFrequency) -> Interest {
        Interest::new(self.rate_for(period), frequency)
    }
}

impl From<Rate> for RateSchedule {
    fn from(rate: Rate) -> Self {
        RateSchedule::Flat(rate)
    }
}

impl Default for RateSchedule {
    fn default() -> Self {
        RateSchedule::Flat(Rate::ZERO)
    }
}
