//! Employee payroll record.

use std::fmt;

/// Well-known field names.
pub mod fields {
    pub const NAME: &str = "Name";
    pub const EMAIL: &str = "Email";
    pub const SALARY: &str = "Salary";
    pub const ACTUAL_PAYABLE_DAYS: &str = "Actual_Payable_Days";
    pub const LOSS_OF_PAY_DAYS: &str = "Loss_of_PayDays";
    pub const ALLOWANCES: &str = "Allowances";
    pub const BONUS: &str = "Bonus";
    pub const PF: &str = "PF";
    pub const PT: &str = "PT";
    pub const TDS: &str = "TDS";
    pub const ARREARS: &str = "Arrears";
    pub const SEND_MAIL: &str = "Send_Mail";

    pub const TOTAL_EARNINGS: &str = "Total_Earnings";
    pub const TOTAL_DEDUCTIONS: &str = "Total_Deductions";
    pub const NET_SALARY: &str = "Net_Salary";
    pub const NET_SALARY_IN_WORDS: &str = "Net_Salary_In_Words";
    pub const MONTH: &str = "Month";
    pub const DAYS_PAYABLE: &str = "Days_Payable";
    pub const BASIC: &str = "Basic";
    pub const ERROR: &str = "Error";
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value. Text is accepted when it parses as a finite float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{:.0}", n),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Case-insensitive, whitespace-tolerant key comparison shared by every
/// stage that reads a record.
pub fn keys_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// One row of payroll input plus any derived fields.
///
/// Insertion order is preserved. A field may be present with no value,
/// which is how empty spreadsheet cells are represented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Option<FieldValue>)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key`, or `None` when the field is absent or null.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entry(key).and_then(|(_, v)| v.as_ref())
    }

    /// Whether the field exists, even with a null value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// Numeric value for `key` if present and coercible.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_f64)
    }

    /// Display text for `key` if present.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string())
    }

    /// Set `key`, overwriting a case-insensitively matching entry in place.
    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) {
        self.set_raw(key, Some(value.into()));
    }

    /// Set `key` to null.
    pub fn set_null(&mut self, key: &str) {
        self.set_raw(key, None);
    }

    fn set_raw(&mut self, key: &str, value: Option<FieldValue>) {
        match self.fields.iter_mut().find(|(k, _)| keys_match(k, key)) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    /// Derivation failure message, if any.
    pub fn error(&self) -> Option<String> {
        self.text(fields::ERROR)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn entry(&self, key: &str) -> Option<&(String, Option<FieldValue>)> {
        self.fields.iter().find(|(k, _)| keys_match(k, key))
    }
}

impl<K: Into<String>> FromIterator<(K, Option<FieldValue>)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Option<FieldValue>)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set_raw(&k.into(), v);
        }
        record
    }
}
