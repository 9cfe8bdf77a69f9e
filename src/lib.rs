pub mod config;
pub mod decimal;
pub mod errors;
pub mod interest;
pub mod loan;
pub mod payments;
pub mod schedule;
pub mod types;

// re-export key types
pub use config::LoanConfig;
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use interest::{Interest, InterestFrequency, RateSchedule};
pub use loan::{Loan, LoanBuilder};
pub use payments::{AmortizationEngine, AmortizationRow, AmortizationTable, PaymentPlan};
pub use schedule::{derive_payment_count, ScheduleGenerator, ScheduleSource};
pub use types::{ComponentMode, LoanId, PaymentFrequency};

// re-export external dependencies that users will need
pub use chrono;
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
