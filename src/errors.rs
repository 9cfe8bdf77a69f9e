use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid schedule on {date}: {message}")]
    InvalidSchedule {
        date: NaiveDate,
        message: String,
    },

    #[error("numeric domain error: {message}")]
    NumericDomain {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("installment {index} out of range: loan has {n_payments} installments")]
    InstallmentOutOfRange {
        index: usize,
        n_payments: usize,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoanError>;
