//! Payslip delivery: the send/withhold decision and the mail transport.

pub mod dispatcher;
pub mod mailer;

pub use dispatcher::{DeliveryDecision, Dispatcher};
pub use mailer::{MailError, Mailer, OutgoingMail, SmtpMailer};
