use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::interest::{InterestFrequency, RateSchedule};
use crate::payments::PaymentPlan;
use crate::types::LoanId;

/// one dated row of the amortization table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub date: NaiveDate,
    /// balance after this row's payment
    pub principal: Money,
    pub principal_payment: Money,
    pub interest: Money,
    pub total_payment: Money,
}

impl AmortizationRow {
    /// zero-activity row at the loan start
    pub fn opening(date: NaiveDate, initial_value: Money) -> Self {
        Self {
            date,
            principal: initial_value,
            principal_payment: Money::ZERO,
            interest: Money::ZERO,
            total_payment: Money::ZERO,
        }
    }
}

/// amortization table, ordered by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationTable {
    pub loan_id: LoanId,
    pub rows: Vec<AmortizationRow>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationTable {
    pub fn new(loan_id: LoanId, rows: Vec<AmortizationRow>) -> Self {
        let total_interest = rows
            .iter()
            .map(|r| r.interest)
            .fold(Money::ZERO, |acc, x| acc + x);

        let total_payment = rows
            .iter()
            .map(|r| r.total_payment)
            .fold(Money::ZERO, |acc, x| acc + x);

        Self {
            loan_id,
            rows,
            total_interest,
            total_payment,
        }
    }

    pub fn total_interest(&self) -> Money {
        self.total_interest
    }

    /// first row on the given date
    pub fn row_on(&self, date: NaiveDate) -> Option<&AmortizationRow> {
        self.rows.iter().find(|r| r.date == date)
    }

    /// balance after the last row
    pub fn final_principal(&self) -> Money {
        self.rows.last().map(|r| r.principal).unwrap_or(Money::ZERO)
    }

    /// date of the first payment that leaves no balance
    pub fn payoff_date(&self) -> Option<NaiveDate> {
        self.rows
            .iter()
            .skip(1)
            .find(|r| !r.principal.is_positive())
            .map(|r| r.date)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for AmortizationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<12}{:>16}{:>20}{:>14}{:>16}",
            "Date", "Principal", "Principal payment", "Interests", "Total payment"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<12}{:>16.2}{:>20.2}{:>14.2}{:>16.2}",
                row.date.to_string(),
                row.principal,
                row.principal_payment,
                row.interest,
                row.total_payment
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Scheduled { installment: usize },
    Additional { amount: Money },
}

#[derive(Debug, Clone, Copy)]
struct TimelineEntry {
    date: NaiveDate,
    kind: EntryKind,
}

impl TimelineEntry {
    /// scheduled installments sort ahead of additional payments on the same date
    fn sort_key(&self) -> (NaiveDate, u8) {
        match self.kind {
            EntryKind::Scheduled { .. } => (self.date, 0),
            EntryKind::Additional { .. } => (self.date, 1),
        }
    }
}

/// state carried from one row to the next
#[derive(Debug, Clone, Copy)]
struct WalkState {
    previous_date: NaiveDate,
    principal: Money,
    /// level installment set by the latest re-amortization
    reamortized_payment: Option<Money>,
    installments_paid: usize,
}

/// walks the payment timeline and splits each payment into principal and interest
pub struct AmortizationEngine<'a> {
    start_date: NaiveDate,
    initial_value: Money,
    payment_dates: &'a [NaiveDate],
    payment: &'a PaymentPlan,
    interest_rate: &'a RateSchedule,
    interest_frequency: InterestFrequency,
    fixed_payments: bool,
}

impl<'a> AmortizationEngine<'a> {
    pub fn new(
        start_date: NaiveDate,
        initial_value: Money,
        payment_dates: &'a [NaiveDate],
        payment: &'a PaymentPlan,
        interest_rate: &'a RateSchedule,
    ) -> Self {
        Self {
            start_date,
            initial_value,
            payment_dates,
            payment,
            interest_rate,
            interest_frequency: InterestFrequency::Annual,
            fixed_payments: false,
        }
    }

    pub fn interest_frequency(mut self, frequency: InterestFrequency) -> Self {
        self.interest_frequency = frequency;
        self
    }

    /// keep the installment size after additional payments and shorten the payoff instead
    pub fn fixed_payments(mut self, fixed: bool) -> Self {
        self.fixed_payments = fixed;
        self
    }

    /// build every row, opening row first. additional payments are merged into
    /// the scheduled dates and applied in date order.
    pub fn run(&self, additional: &BTreeMap<NaiveDate, Money>) -> Result<Vec<AmortizationRow>> {
        let timeline = self.timeline(additional)?;

        let mut rows = Vec::with_capacity(timeline.len() + 1);
        rows.push(AmortizationRow::opening(self.start_date, self.initial_value));

        let initial = WalkState {
            previous_date: self.start_date,
            principal: self.initial_value,
            reamortized_payment: None,
            installments_paid: 0,
        };

        timeline.iter().try_fold(initial, |state, entry| {
            let (next, row) = self.step(state, entry)?;
            rows.push(row);
            Ok::<_, LoanError>(next)
        })?;

        Ok(rows)
    }

    fn timeline(&self, additional: &BTreeMap<NaiveDate, Money>) -> Result<Vec<TimelineEntry>> {
        let mut timeline: Vec<TimelineEntry> = self
            .payment_dates
            .iter()
            .enumerate()
            .map(|(installment, date)| TimelineEntry {
                date: *date,
                kind: EntryKind::Scheduled { installment },
            })
            .collect();

        for (date, amount) in additional {
            if *date <= self.start_date {
                return Err(LoanError::InvalidSchedule {
                    date: *date,
                    message: format!("additional payment is not after start date {}", self.start_date),
                });
            }
            timeline.push(TimelineEntry {
                date: *date,
                kind: EntryKind::Additional { amount: *amount },
            });
        }

        timeline.sort_by_key(TimelineEntry::sort_key);
        Ok(timeline)
    }

    fn step(&self, state: WalkState, entry: &TimelineEntry) -> Result<(WalkState, AmortizationRow)> {
        let interest_model = self
            .interest_rate
            .interest_for(state.installments_paid, self.interest_frequency);
        let interest = state.principal * interest_model.accrual_fraction(entry.date, state.previous_date);

        let mut next = state;

        let principal_payment = match entry.kind {
            EntryKind::Scheduled { installment } => {
                let last = installment + 1 == self.payment_dates.len();
                let scheduled = match state.reamortized_payment {
                    // the final installment absorbs the rounding left by re-amortization
                    Some(_) if last => state.principal,
                    Some(amount) => amount,
                    None => self.payment.amount_for(installment).ok_or_else(|| {
                        LoanError::InvalidSchedule {
                            date: entry.date,
                            message: format!("no payment amount for installment {}", installment + 1),
                        }
                    })?,
                };
                next.installments_paid = installment + 1;
                scheduled.min(state.principal)
            }
            EntryKind::Additional { amount } => {
                // a negative net amount is allowed and grows the balance
                let net = amount - interest;
                if net > state.principal {
                    warn!(
                        "additional payment of {} on {} exceeds outstanding {} plus interest, excess {} not applied",
                        amount,
                        entry.date,
                        state.principal,
                        net - state.principal
                    );
                    state.principal
                } else {
                    net
                }
            }
        };

        next.principal = state.principal - principal_payment;

        if matches!(entry.kind, EntryKind::Additional { .. }) && !self.fixed_payments {
            next.reamortized_payment = Some(self.reamortize(next.principal, next.installments_paid, entry.date)?);
        }

        next.previous_date = entry.date;

        let row = AmortizationRow {
            date: entry.date,
            principal: next.principal,
            principal_payment,
            interest,
            total_payment: principal_payment + interest,
        };

        Ok((next, row))
    }

    /// spread the balance evenly over the installments still to come
    fn reamortize(&self, principal: Money, installments_paid: usize, date: NaiveDate) -> Result<Money> {
        let remaining = self.payment_dates.len().saturating_sub(installments_paid);
        if remaining == 0 {
            return Err(LoanError::InvalidSchedule {
                date,
                message: "additional payment on or after the last scheduled installment leaves nothing to re-amortize"
                    .to_string(),
            });
        }

        let payment = principal / Decimal::from(remaining);
        debug!(
            "re-amortized {} over {} remaining installments: {} each",
            principal, remaining, payment
        );
        Ok(payment)
    }
}
