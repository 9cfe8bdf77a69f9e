pub mod amortization;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};

pub use amortization::{AmortizationEngine, AmortizationRow, AmortizationTable};

/// scheduled principal installment, level or one amount per installment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentPlan {
    Level(Money),
    PerInstallment(Vec<Money>),
}

impl PaymentPlan {
    /// amount due on zero-based installment
    pub fn amount_for(&self, installment: usize) -> Option<Money> {
        match self {
            PaymentPlan::Level(amount) => Some(*amount),
            PaymentPlan::PerInstallment(amounts) => amounts.get(installment).copied(),
        }
    }

    /// sum of the first `count` installments
    pub fn total_of_first(&self, count: usize) -> Money {
        (0..count)
            .filter_map(|installment| self.amount_for(installment))
            .fold(Money::ZERO, |acc, x| acc + x)
    }

    /// a per-installment plan must cover every scheduled installment
    pub fn validate_for(&self, n_payments: usize) -> Result<()> {
        match self {
            PaymentPlan::PerInstallment(amounts) if amounts.len() < n_payments => {
                Err(LoanError::InvalidConfiguration {
                    message: format!(
                        "payment sequence has {} entries but the schedule has {} installments",
                        amounts.len(),
                        n_payments
                    ),
                })
            }
            _ => Ok(()),
        }
    }
}

impl From<Money> for PaymentPlan {
    fn from(amount: Money) -> Self {
        PaymentPlan::Level(amount)
    }
}

impl Default for PaymentPlan {
    fn default() -> Self {
        PaymentPlan::Level(Money::ZERO)
    }
}
