//! Loan and credit-line arithmetic.
//!
//! Pure functions with no I/O. Rates named `annual_rate_pct` are annual
//! percentages (`5.0` means 5 %). Money values are `f64` rounded to cents.
//!
//! Invalid inputs (non-positive principal, zero term) produce degenerate
//! values such as `0.0` instead of errors. Use [`validate_loan_parameters`]
//! or [`LoanTerms::new`] as a pre-flight check.
//!
//! # Examples
//!
//! ```rust
//! use column_sdk::loan::{amortization_schedule, monthly_payment};
//!
//! assert_eq!(monthly_payment(10_000.0, 5.0, 12), 856.07);
//!
//! let schedule = amortization_schedule(10_000.0, 5.0, 12);
//! assert_eq!(schedule.len(), 12);
//! assert_eq!(schedule.last().map(|row| row.balance), Some(0.0));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default floor used by [`minimum_payment`].
pub const DEFAULT_MINIMUM_PAYMENT: f64 = 25.0;

/// Longest supported loan term in months.
pub const MAX_TERM_MONTHS: u32 = 360;

const MONTHS_PER_YEAR: f64 = 12.0;
const DAYS_PER_YEAR: f64 = 365.0;

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / MONTHS_PER_YEAR
}

// ============================================================================
// Installment Loans
// ============================================================================

/// One period of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based period number
    pub period: u32,

    /// Amount paid this period
    pub payment: f64,

    /// Portion of the payment that reduces the balance
    pub principal: f64,

    /// Portion of the payment that covers interest
    pub interest: f64,

    /// Balance remaining after this payment
    pub balance: f64,
}

/// Fixed monthly payment for a fully amortizing loan.
///
/// Uses `M = P·r·(1+r)^n / ((1+r)^n − 1)` with `r` the monthly rate. A zero
/// rate divides the principal evenly across the term. Returns `0.0` when
/// `principal <= 0` or `term_months == 0`.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    if principal <= 0.0 || term_months == 0 {
        return 0.0;
    }

    let n = term_months as f64;
    if annual_rate_pct == 0.0 {
        return round_cents(principal / n);
    }

    let r = monthly_rate(annual_rate_pct);
    let growth = (1.0 + r).powf(n);
    round_cents(principal * r * growth / (growth - 1.0))
}

/// Total interest paid over the life of the loan.
pub fn total_interest(principal: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    let payment = monthly_payment(principal, annual_rate_pct, term_months);
    round_cents(payment * term_months as f64 - principal)
}

/// Simple daily interest accrued over `days`.
pub fn accrued_interest(principal: f64, annual_rate_pct: f64, days: u32) -> f64 {
    if days == 0 {
        return 0.0;
    }
    round_cents(principal * (annual_rate_pct / 100.0 / DAYS_PER_YEAR) * days as f64)
}

/// Amount required to pay the loan off in `days_to_payoff` days.
///
/// `daily_rate` is a decimal fraction per day, not a percentage.
pub fn payoff_amount(current_balance: f64, daily_rate: f64, days_to_payoff: u32) -> f64 {
    round_cents(current_balance + current_balance * daily_rate * days_to_payoff as f64)
}

/// Full payment schedule for an amortizing loan.
///
/// Interest is rounded to cents each period and the principal portion is
/// capped at the running balance. The final row retires whatever balance is
/// left after rounding drift, so its payment is recomputed as principal plus
/// interest rather than reusing the flat monthly payment.
pub fn amortization_schedule(
    principal: f64,
    annual_rate_pct: f64,
    term_months: u32,
) -> Vec<AmortizationRow> {
    let payment = monthly_payment(principal, annual_rate_pct, term_months);
    if payment == 0.0 {
        return Vec::new();
    }

    let r = monthly_rate(annual_rate_pct);
    let mut balance = principal;
    let mut rows = Vec::with_capacity(term_months as usize);

    for period in 1..=term_months {
        let interest = round_cents(balance * r);
        let principal_part = if period == term_months {
            balance
        } else {
            round_cents((payment - interest).min(balance))
        };
        balance = round_cents(balance - principal_part).max(0.0);

        rows.push(AmortizationRow {
            period,
            payment: round_cents(principal_part + interest),
            principal: round_cents(principal_part),
            interest,
            balance,
        });
    }

    rows
}

/// Simplified APR including up-front fees, as a percentage.
///
/// Approximates the average outstanding balance as half the principal.
pub fn approximate_apr(principal: f64, annual_rate_pct: f64, term_months: u32, fees: f64) -> f64 {
    if principal <= 0.0 || term_months == 0 {
        return 0.0;
    }

    let interest = monthly_payment(principal, annual_rate_pct, term_months) * term_months as f64
        - principal
        + fees;
    let average_balance = principal / 2.0;
    let years = term_months as f64 / MONTHS_PER_YEAR;

    round_cents(interest / average_balance / years * 100.0)
}

// ============================================================================
// Revolving Credit
// ============================================================================

/// Minimum monthly payment on a revolving balance.
///
/// One month of interest plus 1 % of the balance, but never less than
/// `min(floor, balance)`.
pub fn minimum_payment(balance: f64, annual_rate_pct: f64, floor: f64) -> f64 {
    if balance <= 0.0 {
        return 0.0;
    }

    let interest = balance * monthly_rate(annual_rate_pct);
    let computed = round_cents(interest + balance * 0.01);
    computed.max(floor.min(balance))
}

/// Remaining credit on a line, never negative.
pub fn available_credit(limit: f64, balance: f64) -> f64 {
    (limit - balance).max(0.0)
}

/// Balance as a fraction of the limit, rounded to four places.
///
/// Over-limit balances report values above 1.0. A non-positive limit yields 0.
pub fn utilization(balance: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        return 0.0;
    }
    (balance / limit * 10_000.0).round() / 10_000.0
}

// ============================================================================
// Delinquency
// ============================================================================

/// Whole days elapsed since `due`, clamped at zero.
pub fn days_past_due(due: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let days = (now - due).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// Delinquency bucket for a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelinquencyStatus {
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "delinquent_30")]
    Delinquent30,
    #[serde(rename = "delinquent_60")]
    Delinquent60,
    #[serde(rename = "delinquent_90")]
    Delinquent90,
    #[serde(rename = "delinquent_120")]
    Delinquent120,
    #[serde(rename = "default")]
    Default,
}

impl DelinquencyStatus {
    /// Bucket a days-past-due count.
    pub fn from_days_past_due(days: u32) -> Self {
        match days {
            0 => Self::Current,
            1..=30 => Self::Delinquent30,
            31..=60 => Self::Delinquent60,
            61..=90 => Self::Delinquent90,
            91..=120 => Self::Delinquent120,
            _ => Self::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Delinquent30 => "delinquent_30",
            Self::Delinquent60 => "delinquent_60",
            Self::Delinquent90 => "delinquent_90",
            Self::Delinquent120 => "delinquent_120",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for DelinquencyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Outcome of [`validate_loan_parameters`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

fn parameter_errors(principal: f64, rate: f64, term_months: u32) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if principal <= 0.0 {
        errors.push(ValidationError::OutOfRange {
            field: "principal".to_string(),
            message: "Principal must be greater than 0".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&rate) {
        errors.push(ValidationError::OutOfRange {
            field: "rate".to_string(),
            message: "Interest rate must be between 0% and 100%".to_string(),
        });
    }

    if !(1..=MAX_TERM_MONTHS).contains(&term_months) {
        errors.push(ValidationError::OutOfRange {
            field: "term_months".to_string(),
            message: format!("Term must be between 1 and {} months", MAX_TERM_MONTHS),
        });
    }

    errors
}

/// Pre-flight check for loan inputs.
///
/// `rate` is the annual rate as a decimal fraction (`0.05` for 5 %).
pub fn validate_loan_parameters(principal: f64, rate: f64, term_months: u32) -> LoanValidation {
    let errors: Vec<String> = parameter_errors(principal, rate, term_months)
        .into_iter()
        .map(|e| match e {
            ValidationError::OutOfRange { message, .. } => message,
            other => other.to_string(),
        })
        .collect();

    LoanValidation {
        valid: errors.is_empty(),
        errors,
    }
}

/// Loan parameters checked at construction.
///
/// # Examples
///
/// ```rust
/// use column_sdk::loan::LoanTerms;
///
/// let loan = LoanTerms::new(12_000.0, 0.0, 12).unwrap();
/// assert_eq!(loan.monthly_payment(), 1000.0);
///
/// assert!(LoanTerms::new(-1.0, 5.0, 12).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoanTerms {
    principal: f64,
    annual_rate_pct: f64,
    term_months: u32,
}

impl LoanTerms {
    /// Validate and build loan terms. The rate is an annual percentage.
    pub fn new(principal: f64, annual_rate_pct: f64, term_months: u32) -> Result<Self, ValidationError> {
        if let Some(first) = parameter_errors(principal, annual_rate_pct / 100.0, term_months)
            .into_iter()
            .next()
        {
            return Err(first);
        }

        Ok(Self {
            principal,
            annual_rate_pct,
            term_months,
        })
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn annual_rate_pct(&self) -> f64 {
        self.annual_rate_pct
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    pub fn monthly_payment(&self) -> f64 {
        monthly_payment(self.principal, self.annual_rate_pct, self.term_months)
    }

    pub fn total_interest(&self) -> f64 {
        total_interest(self.principal, self.annual_rate_pct, self.term_months)
    }

    pub fn schedule(&self) -> Vec<AmortizationRow> {
        amortization_schedule(self.principal, self.annual_rate_pct, self.term_months)
    }

    /// APR including `fees`, as a percentage.
    pub fn apr(&self, fees: f64) -> f64 {
        approximate_apr(self.principal, self.annual_rate_pct, self.term_months, fees)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
