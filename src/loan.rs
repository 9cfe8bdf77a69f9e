use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;
use uuid::Uuid;

use crate::config::LoanConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::interest::{InterestFrequency, RateSchedule};
use crate::payments::{AmortizationEngine, AmortizationTable, PaymentPlan};
use crate::schedule::{ScheduleGenerator, ScheduleSource};
use crate::types::{ComponentMode, LoanId, PaymentFrequency};

/// loan record: static terms, materialised payment dates and additional payments
#[derive(Debug, Clone, Serialize)]
pub struct Loan {
    id: LoanId,
    start_date: NaiveDate,
    initial_value: Money,
    payment: PaymentPlan,
    n_payments: usize,
    fixed_payments: bool,
    payment_frequency: Option<PaymentFrequency>,
    payment_dates: Vec<NaiveDate>,
    interest_rate: RateSchedule,
    interest_frequency: InterestFrequency,
    additional_payment: BTreeMap<NaiveDate, Money>,
    component_mode: ComponentMode,
    /// balance at construction; the amortization table carries the running value
    principal: Money,
}

impl Loan {
    /// validate the terms and generate the payment dates
    pub fn new(config: LoanConfig) -> Result<Self> {
        if config.initial_value.is_negative() {
            return Err(LoanError::InvalidConfiguration {
                message: format!("initial value must not be negative, got {}", config.initial_value),
            });
        }
        let source = ScheduleSource::from_parts(config.payment_frequency, config.payment_dates)?;
        config.interest_rate.validate()?;

        let payment_dates = ScheduleGenerator::new(config.start_date, source).generate(
            config.n_payments,
            config.initial_value,
            &config.payment,
        )?;
        let n_payments = payment_dates.len();
        config.payment.validate_for(n_payments)?;

        let loan = Self {
            id: Uuid::new_v4(),
            start_date: config.start_date,
            initial_value: config.initial_value,
            payment: config.payment,
            n_payments,
            fixed_payments: config.fixed_payments,
            payment_frequency: config.payment_frequency,
            payment_dates,
            interest_rate: config.interest_rate,
            interest_frequency: config.interest_frequency,
            additional_payment: config.additional_payment,
            component_mode: config.component_mode,
            principal: config.initial_value,
        };

        info!(
            "loan {} created: {} over {} installments from {}",
            loan.id, loan.initial_value, loan.n_payments, loan.start_date
        );

        Ok(loan)
    }

    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }

    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn initial_value(&self) -> Money {
        self.initial_value
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn payment(&self) -> &PaymentPlan {
        &self.payment
    }

    pub fn n_payments(&self) -> usize {
        self.n_payments
    }

    pub fn fixed_payments(&self) -> bool {
        self.fixed_payments
    }

    pub fn payment_frequency(&self) -> Option<PaymentFrequency> {
        self.payment_frequency
    }

    pub fn payment_dates(&self) -> &[NaiveDate] {
        &self.payment_dates
    }

    pub fn interest_rate(&self) -> &RateSchedule {
        &self.interest_rate
    }

    pub fn additional_payments(&self) -> &BTreeMap<NaiveDate, Money> {
        &self.additional_payment
    }

    pub fn component_mode(&self) -> ComponentMode {
        self.component_mode
    }

    /// record an out-of-schedule payment, replacing any amount already on that date.
    /// takes effect on the next amortization run.
    pub fn add_payment(&mut self, date: NaiveDate, amount: Money) {
        if let Some(previous) = self.additional_payment.insert(date, amount) {
            debug!("loan {}: additional payment on {} replaced {} with {}", self.id, date, previous, amount);
        } else {
            debug!("loan {}: additional payment of {} on {}", self.id, amount, date);
        }
    }

    /// engine over this loan's terms
    pub fn engine(&self) -> AmortizationEngine<'_> {
        AmortizationEngine::new(
            self.start_date,
            self.initial_value,
            &self.payment_dates,
            &self.payment,
            &self.interest_rate,
        )
        .interest_frequency(self.interest_frequency)
        .fixed_payments(self.fixed_payments)
    }

    /// full schedule including every additional payment recorded so far
    pub fn create_amortization(&self) -> Result<AmortizationTable> {
        let rows = self.engine().run(&self.additional_payment)?;
        let table = AmortizationTable::new(self.id, rows);

        info!(
            "loan {} amortized: {} rows, total interest {}",
            self.id,
            table.rows.len(),
            table.total_interest.round_dp(2)
        );

        Ok(table)
    }

    /// balance after the scheduled installments due on or before `date`, floored at zero.
    /// ignores additional payments and interest; the amortization table is the full ledger.
    pub fn principal_as_of(&self, date: NaiveDate) -> Money {
        let paid = self.payment_dates.iter().take_while(|d| **d <= date).count();
        (self.initial_value - self.payment.total_of_first(paid)).max(Money::ZERO)
    }

    /// principal part of installment `index` (1-based, 0 is the loan start)
    pub fn principal_payment_component(&self, index: usize) -> Result<Money> {
        if index == 0 {
            return Ok(Money::ZERO);
        }
        let amount = self.installment_amount(index)?;
        Ok(amount.min(self.remaining_before(index)))
    }

    /// interest part of installment `index` (1-based, 0 is the loan start)
    pub fn interest_payment_component(&self, index: usize) -> Result<Money> {
        match self.component_mode {
            ComponentMode::Legacy => self.principal_payment_component(index),
            ComponentMode::Accrued => {
                if index == 0 {
                    return Ok(Money::ZERO);
                }
                self.installment_amount(index)?;
                let current = self.payment_dates[index - 1];
                let previous = if index == 1 {
                    self.start_date
                } else {
                    self.payment_dates[index - 2]
                };
                let interest = self
                    .interest_rate
                    .interest_for(index - 1, self.interest_frequency);
                Ok(self.remaining_before(index) * interest.accrual_fraction(current, previous))
            }
        }
    }

    fn installment_amount(&self, index: usize) -> Result<Money> {
        if index > self.n_payments {
            return Err(LoanError::InstallmentOutOfRange {
                index,
                n_payments: self.n_payments,
            });
        }
        self.payment
            .amount_for(index - 1)
            .ok_or(LoanError::InstallmentOutOfRange {
                index,
                n_payments: self.n_payments,
            })
    }

    /// scheduled balance before installment `index`
    fn remaining_before(&self, index: usize) -> Money {
        (self.initial_value - self.payment.total_of_first(index - 1)).max(Money::ZERO)
    }
}

/// fluent construction, validated by `build`
pub struct LoanBuilder {
    start_date: Option<NaiveDate>,
    initial_value: Option<Money>,
    payment: Option<PaymentPlan>,
    n_payments: usize,
    fixed_payments: bool,
    payment_frequency: Option<PaymentFrequency>,
    payment_dates: Option<Vec<NaiveDate>>,
    interest_rate: Option<RateSchedule>,
    interest_frequency: InterestFrequency,
    additional_payment: BTreeMap<NaiveDate, Money>,
    component_mode: ComponentMode,
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self {
            start_date: None,
            initial_value: None,
            payment: None,
            n_payments: 0,
            fixed_payments: false,
            payment_frequency: None,
            payment_dates: None,
            interest_rate: None,
            interest_frequency: InterestFrequency::Annual,
            additional_payment: BTreeMap::new(),
            component_mode: ComponentMode::default(),
        }
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn initial_value(mut self, amount: Money) -> Self {
        self.initial_value = Some(amount);
        self
    }

    pub fn payment(mut self, payment: impl Into<PaymentPlan>) -> Self {
        self.payment = Some(payment.into());
        self
    }

    pub fn payments(mut self, amounts: Vec<Money>) -> Self {
        self.payment = Some(PaymentPlan::PerInstallment(amounts));
        self
    }

    pub fn n_payments(mut self, count: usize) -> Self {
        self.n_payments = count;
        self
    }

    pub fn fixed_payments(mut self, fixed: bool) -> Self {
        self.fixed_payments = fixed;
        self
    }

    pub fn payment_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.payment_frequency = Some(frequency);
        self
    }

    pub fn payment_dates(mut self, dates: Vec<NaiveDate>) -> Self {
        self.payment_dates = Some(dates);
        self
    }

    pub fn interest_rate(mut self, rate: impl Into<RateSchedule>) -> Self {
        self.interest_rate = Some(rate.into());
        self
    }

    pub fn interest_frequency(mut self, frequency: InterestFrequency) -> Self {
        self.interest_frequency = frequency;
        self
    }

    pub fn additional_payment(mut self, date: NaiveDate, amount: Money) -> Self {
        self.additional_payment.insert(date, amount);
        self
    }

    pub fn component_mode(mut self, mode: ComponentMode) -> Self {
        self.component_mode = mode;
        self
    }

    pub fn into_config(self) -> Result<LoanConfig> {
        let start_date = self.start_date.ok_or(LoanError::InvalidConfiguration {
            message: "start date required".to_string(),
        })?;

        let initial_value = self.initial_value.ok_or(LoanError::InvalidConfiguration {
            message: "initial value required".to_string(),
        })?;

        Ok(LoanConfig {
            start_date,
            initial_value,
            payment: self.payment.unwrap_or_default(),
            n_payments: self.n_payments,
            fixed_payments: self.fixed_payments,
            payment_frequency: self.payment_frequency,
            payment_dates: self.payment_dates,
            interest_rate: self.interest_rate.unwrap_or_default(),
            interest_frequency: self.interest_frequency,
            additional_payment: self.additional_payment,
            component_mode: self.component_mode,
        })
    }

    pub fn build(self) -> Result<Loan> {
        Loan::new(self.into_config()?)
    }
}

impl Default for LoanBuilder {
    fn default() -> Self {
        Self::new()
    }
}
