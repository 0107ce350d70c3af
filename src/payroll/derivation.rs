//! Payroll field derivation.
//!
//! Basic pay is pro-rated over payable days:
//!
//! ```text
//! days_payable     = Actual_Payable_Days - Loss_of_PayDays
//! basic            = days_payable * (Salary / Actual_Payable_Days)
//! total_earnings   = basic + Allowances + Bonus
//! total_deductions = PF + PT + TDS + Arrears
//! net_salary       = total_earnings - total_deductions
//! ```

use chrono::{Datelike, Local, NaiveDate};
use thiserror::Error;

use super::record::{fields, Record};
use super::words::net_salary_in_words;

const EARNINGS_KEYS: [&str; 2] = [fields::ALLOWANCES, fields::BONUS];
const DEDUCTIONS_KEYS: [&str; 4] = [fields::PF, fields::PT, fields::TDS, fields::ARREARS];

const CONVERSION_ERROR: &str = "Conversion error";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DerivationError {
    #[error("missing value for {0}")]
    MissingField(&'static str),
    #[error("{field} is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },
    #[error("division by zero: {0} is 0")]
    DivisionByZero(&'static str),
    #[error("cannot determine the month before {0}")]
    InvalidDate(NaiveDate),
}

/// Fields computed for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFields {
    pub days_payable: f64,
    pub basic: f64,
    pub total_earnings: f64,
    pub total_deductions: f64,
    pub net_salary: f64,
    pub net_salary_in_words: String,
    pub month: String,
}

impl DerivedFields {
    /// Compute payroll fields from `record` as of `today`.
    pub fn compute(record: &Record, today: NaiveDate) -> Result<Self, DerivationError> {
        let salary = required(record, fields::SALARY)?;
        let actual_days = required(record, fields::ACTUAL_PAYABLE_DAYS)?;
        let loss_of_pay_days = required(record, fields::LOSS_OF_PAY_DAYS)?;

        if actual_days == 0.0 {
            return Err(DerivationError::DivisionByZero(fields::ACTUAL_PAYABLE_DAYS));
        }

        let days_payable = actual_days - loss_of_pay_days;
        let salary_per_day = salary / actual_days;
        let basic = days_payable * salary_per_day;

        let total_earnings = basic + sum_of(record, &EARNINGS_KEYS);
        let total_deductions = sum_of(record, &DEDUCTIONS_KEYS);
        let net_salary = total_earnings - total_deductions;

        let net_salary_in_words = net_salary_in_words(net_salary).unwrap_or_else(|e| {
            log::warn!("Could not spell net salary {}: {}", net_salary, e);
            CONVERSION_ERROR.to_string()
        });

        Ok(Self {
            days_payable,
            basic,
            total_earnings,
            total_deductions,
            net_salary,
            net_salary_in_words,
            month: previous_month_label(today)?,
        })
    }

    /// Write the fields into `record` using the payslip's text formats.
    pub fn apply(self, record: &mut Record) {
        record.set(fields::TOTAL_EARNINGS, format!("{:.2}", self.total_earnings));
        record.set(fields::TOTAL_DEDUCTIONS, format!("{:.2}", self.total_deductions));
        record.set(fields::NET_SALARY, format!("{:.2}", self.net_salary));
        record.set(fields::NET_SALARY_IN_WORDS, self.net_salary_in_words);
        record.set(fields::MONTH, self.month);
        record.set(fields::DAYS_PAYABLE, self.days_payable);
        record.set(fields::BASIC, format!("{:.2}", self.basic));
    }
}

/// Derive payroll fields into `record` in place.
///
/// On failure the record gains an `Error` field instead and none of the
/// derived fields; the error is also returned so callers can stop the row.
pub fn derive(record: &mut Record, today: NaiveDate) -> Result<(), DerivationError> {
    match DerivedFields::compute(record, today) {
        Ok(derived) => {
            derived.apply(record);
            Ok(())
        }
        Err(e) => {
            record.set(
                fields::ERROR,
                format!("Error calculating derived fields: {}", e),
            );
            Err(e)
        }
    }
}

/// [`derive`] against the local system date.
pub fn derive_now(record: &mut Record) -> Result<(), DerivationError> {
    derive(record, Local::now().date_naive())
}

/// Full month name and year of the calendar month before `today`.
pub fn previous_month_label(today: NaiveDate) -> Result<String, DerivationError> {
    let previous = today
        .with_day(1)
        .and_then(|first| first.pred_opt())
        .ok_or(DerivationError::InvalidDate(today))?;
    Ok(previous.format("%B %Y").to_string())
}

fn required(record: &Record, field: &'static str) -> Result<f64, DerivationError> {
    let value = record.get(field).ok_or(DerivationError::MissingField(field))?;
    value.as_f64().ok_or_else(|| DerivationError::NotNumeric {
        field,
        value: value.to_string(),
    })
}

fn sum_of(record: &Record, keys: &[&str]) -> f64 {
    keys.iter().map(|k| record.number(k).unwrap_or(0.0)).sum()
}
