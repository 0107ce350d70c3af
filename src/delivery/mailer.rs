//! Outgoing email transport.

use std::fs;
use std::path::PathBuf;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP credentials are not configured")]
    MissingCredentials,
    #[error("invalid address {address}: {reason}")]
    Address { address: String, reason: String },
    #[error("failed to read attachment: {0}")]
    Attachment(#[from] std::io::Error),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

/// A message with a single PDF attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: PathBuf,
}

/// Sends [`OutgoingMail`]. Implementations block until delivery completes.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// STARTTLS submission to the configured SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, sender: &str, mail: &OutgoingMail) -> Result<Message, MailError> {
        let data = fs::read(&mail.attachment)?;
        let filename = mail
            .attachment
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "payslip.pdf".to_string());
        let pdf = ContentType::parse("application/pdf").map_err(|e| MailError::Build(e.to_string()))?;

        Message::builder()
            .from(parse_mailbox(sender)?)
            .to(parse_mailbox(&mail.to)?)
            .subject(mail.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(mail.body.clone()))
                    .singlepart(Attachment::new(filename).body(data, pdf)),
            )
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let (Some(sender), Some(password)) = (
            self.config.sender_email.as_deref(),
            self.config.sender_password.as_deref(),
        ) else {
            return Err(MailError::MissingCredentials);
        };

        let message = self.build_message(sender, mail)?;

        let transport = SmtpTransport::starttls_relay(&self.config.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(self.config.port)
            .credentials(Credentials::new(sender.to_string(), password.to_string()))
            .build();

        transport
            .send(&message)
            .map_err(|e| MailError::Transport(e.to_string()))?;

        log::info!("Payslip sent to {}", mail.to);
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.trim().parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}
