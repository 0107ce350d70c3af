//! Per-record delivery decision.

use std::path::Path;

use super::mailer::{Mailer, OutgoingMail};
use crate::payroll::{fields, Record};

/// What should happen to a generated payslip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryDecision {
    /// `Send_Mail` is `no`: keep the file, send nothing.
    Withhold,
    /// Email the file to this address.
    Email(String),
    /// Sending was not declined but there is no address.
    NoAddress,
}

impl DeliveryDecision {
    pub fn for_record(record: &Record) -> Self {
        let send_mail = record
            .text(fields::SEND_MAIL)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_default();

        if send_mail == "no" {
            return DeliveryDecision::Withhold;
        }

        match record.text(fields::EMAIL).map(|e| e.trim().to_string()) {
            Some(email) if !email.is_empty() => DeliveryDecision::Email(email),
            _ => DeliveryDecision::NoAddress,
        }
    }

    pub fn is_withheld(&self) -> bool {
        matches!(self, DeliveryDecision::Withhold)
    }
}

/// Applies [`DeliveryDecision`]s through a [`Mailer`].
pub struct Dispatcher<'a> {
    mailer: &'a dyn Mailer,
    signature: &'a str,
}

impl<'a> Dispatcher<'a> {
    pub fn new(mailer: &'a dyn Mailer, signature: &'a str) -> Self {
        Self { mailer, signature }
    }

    /// Deliver `artifact` for `record` and describe the outcome as a status line
    /// prefixed with `employee`. Never fails: transport errors become the status.
    pub fn dispatch(&self, record: &Record, employee: &str, artifact: &Path) -> String {
        match DeliveryDecision::for_record(record) {
            DeliveryDecision::Withhold => {
                format!("{}: Payslip generated, but email not sent as requested.", employee)
            }
            DeliveryDecision::NoAddress => {
                format!("{}: Email not provided. Payslip not sent.", employee)
            }
            DeliveryDecision::Email(to) => {
                let mail = self.compose(record, to, artifact);
                match self.mailer.send(&mail) {
                    Ok(()) => format!("{}: Payslip emailed to the employee.", employee),
                    Err(e) => {
                        log::warn!("Failed to send payslip to {}: {}", mail.to, e);
                        format!("{}: Failed to send email: {}", employee, e)
                    }
                }
            }
        }
    }

    fn compose(&self, record: &Record, to: String, artifact: &Path) -> OutgoingMail {
        let name = record.text(fields::NAME).unwrap_or_default();
        let month = record.text(fields::MONTH).unwrap_or_default();

        OutgoingMail {
            to,
            subject: format!("Your Payslip - {}", month),
            body: format!(
                "Dear {},\n\n\
                 We hope this email finds you well.\n\n\
                 Please find your salary slip for the month of {}.\n\
                 Kindly review it at your earliest convenience and let us know if you have any questions.\n\n\
                 Best regards,\n\
                 {}",
                name, month, self.signature
            ),
            attachment: artifact.to_path_buf(),
        }
    }
}
