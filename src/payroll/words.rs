//! Amounts in Indian-English currency words.
//!
//! `30400.0` renders as `thirty thousand, four hundred rupees, zero cents`;
//! [`net_salary_in_words`] adds title casing and the ` Only` suffix used on
//! payslips.

use thiserror::Error;

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;

/// Largest whole amount that can be spelled (exclusive).
const MAX_AMOUNT: u64 = 1_000 * CRORE;

const CURRENCY: &str = "rupees";
const SUBUNIT: (&str, &str) = ("cent", "cents");

#[derive(Debug, Error, PartialEq)]
pub enum WordsError {
    #[error("amount {0} is not a finite number")]
    NotFinite(f64),
    #[error("amount {0} is too large to spell")]
    Overflow(f64),
}

/// Payslip rendering: title-cased currency words with an ` Only` suffix.
pub fn net_salary_in_words(amount: f64) -> Result<String, WordsError> {
    currency_in_words(amount).map(|words| format!("{} Only", title_case(&words)))
}

/// Lower-case currency words for `amount`, rounded half-up to the cent.
pub fn currency_in_words(amount: f64) -> Result<String, WordsError> {
    if !amount.is_finite() {
        return Err(WordsError::NotFinite(amount));
    }

    let total_cents = (amount.abs() * 100.0).round();
    if total_cents >= (MAX_AMOUNT * 100) as f64 {
        return Err(WordsError::Overflow(amount));
    }

    let total_cents = total_cents as u64;
    let (whole, cents) = (total_cents / 100, total_cents % 100);
    let minus = if amount < 0.0 && total_cents > 0 { "minus " } else { "" };
    let subunit = if cents == 1 { SUBUNIT.0 } else { SUBUNIT.1 };

    Ok(format!(
        "{}{} {}, {} {}",
        minus,
        cardinal(whole),
        CURRENCY,
        cardinal(cents),
        subunit
    ))
}

/// Cardinal words using crore/lakh grouping.
pub fn cardinal(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let groups = [
        (n / CRORE, "crore"),
        ((n % CRORE) / LAKH, "lakh"),
        ((n % LAKH) / THOUSAND, "thousand"),
    ];

    let mut out = String::new();
    for (count, noun) in groups {
        if count == 0 {
            continue;
        }
        if !out.is_empty() {
            out.push_str(", ");
        }
        // crore counts can exceed 99 and are spelled with their own hundreds
        out.push_str(&below_thousand(count));
        out.push(' ');
        out.push_str(noun);
    }

    let rest = n % THOUSAND;
    if rest > 0 {
        if !out.is_empty() {
            out.push_str(if rest < 100 { " and " } else { ", " });
        }
        out.push_str(&below_thousand(rest));
    }

    out
}

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    match (hundreds, rest) {
        (0, _) => below_hundred(rest),
        (h, 0) => format!("{} hundred", ONES[h as usize]),
        (h, r) => format!("{} hundred and {}", ONES[h as usize], below_hundred(r)),
    }
}

fn below_hundred(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        return ONES[n].to_string();
    }
    match n % 10 {
        0 => TENS[n / 10].to_string(),
        unit => format!("{}-{}", TENS[n / 10], ONES[unit]),
    }
}

/// Upper-case the first letter of every alphabetic run and lower-case the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
