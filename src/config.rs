//! Runtime configuration.
//!
//! Everything the payslip pipeline needs from the environment is collected
//! once into a [`PayslipConfig`] and handed to the batch explicitly.

use std::env;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_TEMPLATE_PATH: &str = "static/payslip_template.docx";
const DEFAULT_OUTPUT_DIR: &str = "generated_payslips";
const DEFAULT_NOT_SENT_DIR: &str = "not_sent_payslips";
const DEFAULT_CONVERTER_PROGRAM: &str = "soffice";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_MAIL_SIGNATURE: &str = "HR Team";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// SMTP submission settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub sender_email: Option<String>,
    pub sender_password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            sender_email: None,
            sender_password: None,
        }
    }
}

/// Configuration consumed by [`crate::batch::PayslipBatch`].
#[derive(Debug, Clone)]
pub struct PayslipConfig {
    /// DOCX template with `{Field}` placeholders.
    pub template_path: PathBuf,
    /// Destination for payslips that are (or may be) emailed.
    pub output_dir: PathBuf,
    /// Destination for payslips withheld with `Send_Mail = no`.
    pub not_sent_dir: PathBuf,
    /// Office executable used for DOCX to PDF conversion.
    pub converter_program: PathBuf,
    pub smtp: SmtpConfig,
    /// Closing line of the payslip email.
    pub mail_signature: String,
}

impl Default for PayslipConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            not_sent_dir: PathBuf::from(DEFAULT_NOT_SENT_DIR),
            converter_program: PathBuf::from(DEFAULT_CONVERTER_PROGRAM),
            smtp: SmtpConfig::default(),
            mail_signature: DEFAULT_MAIL_SIGNATURE.to_string(),
        }
    }
}

impl PayslipConfig {
    /// Build the configuration from process environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let smtp = SmtpConfig {
            host: env_or("SMTP_HOST", &defaults.smtp.host),
            port: parse_env("SMTP_PORT", DEFAULT_SMTP_PORT)?,
            sender_email: env_opt("SENDER_EMAIL"),
            sender_password: env_opt("SENDER_PASSWORD"),
        };

        if smtp.sender_email.is_none() || smtp.sender_password.is_none() {
            log::warn!("SENDER_EMAIL or SENDER_PASSWORD not set, payslip emails will fail");
        }

        Ok(Self {
            template_path: env_opt("PAYSLIP_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_path),
            output_dir: env_opt("PAYSLIP_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            not_sent_dir: env_opt("PAYSLIP_NOT_SENT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.not_sent_dir),
            converter_program: env_opt("SOFFICE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.converter_program),
            smtp,
            mail_signature: env_or("MAIL_SIGNATURE", &defaults.mail_signature),
        })
    }

    /// Create both output directories.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        fs::create_dir_all(&self.not_sent_dir)
    }
}

/// Settings for the HTTP listener.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let allowed_origins = env_opt("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            port: parse_env("PORT", DEFAULT_PORT)?,
            allowed_origins,
        })
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn parse_env(key: &str, default: u16) -> Result<u16, ConfigError> {
    match env_opt(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}
