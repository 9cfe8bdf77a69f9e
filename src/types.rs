use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// payment cadence for generated schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentFrequency {
    Annual,
    SemiAnnual,
    Quarterly,
    Monthly,
}

impl PaymentFrequency {
    /// months between consecutive installments
    pub fn period_months(&self) -> u32 {
        match self {
            PaymentFrequency::Annual => 12,
            PaymentFrequency::SemiAnnual => 6,
            PaymentFrequency::Quarterly => 3,
            PaymentFrequency::Monthly => 1,
        }
    }
}

/// how installment component queries are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentMode {
    /// principal capped at the remaining balance, interest accrued on it
    #[default]
    Accrued,
    /// both queries return the capped installment, as older releases did.
    /// the capping here always compares installment i against the balance
    /// before it; older releases compared against the balance one installment
    /// later, so values can differ near the end of the schedule.
    Legacy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_months() {
        assert_eq!(PaymentFrequency::Annual.period_months(), 12);
        assert_eq!(PaymentFrequency::SemiAnnual.period_months(), 6);
        assert_eq!(PaymentFrequency::Quarterly.period_months(), 3);
        assert_eq!(PaymentFrequency::Monthly.period_months(), 1);
    }

    #[test]
    fn test_frequency_wire_names() {
        let parsed: PaymentFrequency = serde_json::from_str("\"semi-annual\"").unwrap();
        assert_eq!(parsed, PaymentFrequency::SemiAnnual);
        assert_eq!(serde_json::to_string(&PaymentFrequency::Quarterly).unwrap(), "\"quarterly\"");
    }
}
