//! Sequential payslip batch.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use parking_lot::Mutex;

use crate::config::PayslipConfig;
use crate::delivery::{DeliveryDecision, Dispatcher, Mailer, SmtpMailer};
use crate::document::{render_template, ConversionError, DocumentConverter, LibreOfficeConverter};
use crate::payroll::{self, fields, Record};

/// Drives uploaded payroll rows through derivation, templating, conversion
/// and delivery, one record at a time.
///
/// Concurrent callers are serialized: a second batch waits until the first
/// has finished, since both share the output directories and the converter.
pub struct PayslipBatch {
    config: PayslipConfig,
    converter: Box<dyn DocumentConverter>,
    mailer: Box<dyn Mailer>,
    running: Mutex<()>,
}

impl PayslipBatch {
    pub fn new(
        config: PayslipConfig,
        converter: Box<dyn DocumentConverter>,
        mailer: Box<dyn Mailer>,
    ) -> Self {
        Self {
            config,
            converter,
            mailer,
            running: Mutex::new(()),
        }
    }

    /// Batch wired to LibreOffice and SMTP as configured.
    pub fn from_config(config: PayslipConfig) -> Self {
        let converter = LibreOfficeConverter::new(config.converter_program.clone());
        let mailer = SmtpMailer::new(config.smtp.clone());
        Self::new(config, Box::new(converter), Box::new(mailer))
    }

    pub fn config(&self) -> &PayslipConfig {
        &self.config
    }

    /// Process an uploaded CSV file, returning one status line per record, or
    /// a single line when the file itself cannot be parsed.
    pub fn run(&self, csv: &[u8]) -> Vec<String> {
        self.run_on(csv, Local::now().date_naive())
    }

    /// [`PayslipBatch::run`] with a fixed processing date.
    pub fn run_on(&self, csv: &[u8], today: NaiveDate) -> Vec<String> {
        let _running = match self.running.try_lock() {
            Some(guard) => guard,
            None => {
                log::info!("Another payslip batch is running, waiting for it to finish");
                self.running.lock()
            }
        };

        let records = match payroll::parse_records(csv) {
            Ok(records) => records,
            Err(e) => {
                log::error!("Failed to parse uploaded CSV: {}", e);
                return vec![format!("Failed to process CSV file: {}", e)];
            }
        };

        log::info!("Processing payslip batch of {} records", records.len());
        let statuses: Vec<String> = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| self.process_record(i + 1, record, today))
            .collect();
        log::info!("Payslip batch finished");

        statuses
    }

    fn process_record(&self, number: usize, mut record: Record, today: NaiveDate) -> String {
        if let Err(e) = payroll::derive(&mut record, today) {
            log::warn!("Record {}: derivation failed: {}", number, e);
            return format!("Error calculating derived fields for record {}: {}", number, e);
        }

        let document = match render_template(&self.config.template_path, &record) {
            Ok(document) => document,
            Err(e) => {
                let name = record
                    .text(fields::NAME)
                    .unwrap_or_else(|| fallback_name(number));
                log::warn!("Record {}: template failed: {}", number, e);
                return format!("{}: Error processing DOCX template: {}", name, e);
            }
        };

        let employee = employee_label(&record, number);
        let decision = DeliveryDecision::for_record(&record);
        let target_dir = if decision.is_withheld() {
            &self.config.not_sent_dir
        } else {
            &self.config.output_dir
        };
        let docx_path = target_dir.join(payslip_filename(&employee, &record));

        if let Err(e) = fs::create_dir_all(target_dir)
            .map_err(Into::into)
            .and_then(|_| document.save(&docx_path))
        {
            log::warn!("{}: could not save {}: {}", employee, docx_path.display(), e);
            return format!("{}: Error saving DOCX file: {}", employee, e);
        }

        let pdf_path = match self.convert(&docx_path) {
            Ok(path) => path,
            Err(ConvertFailure::Missing) => {
                return format!("{}: PDF conversion failed.", employee);
            }
            Err(ConvertFailure::Other(reason)) => {
                return format!(
                    "{}: Error during PDF conversion or DOCX cleanup: {}",
                    employee, reason
                );
            }
        };

        Dispatcher::new(self.mailer.as_ref(), &self.config.mail_signature)
            .dispatch(&record, &employee, &pdf_path)
    }

    /// Convert and remove the intermediate DOCX. The DOCX is removed on
    /// failure too, so it is never left in a served directory.
    fn convert(&self, docx_path: &Path) -> Result<PathBuf, ConvertFailure> {
        let converted = self.converter.convert(docx_path).map_err(|e| {
            log::warn!("Conversion of {} failed: {}", docx_path.display(), e);
            match e {
                ConversionError::OutputMissing(_) => ConvertFailure::Missing,
                other => ConvertFailure::Other(other.to_string()),
            }
        });

        let pdf_path = match converted {
            Ok(path) if path.exists() => path,
            Ok(_) => {
                discard(docx_path);
                return Err(ConvertFailure::Missing);
            }
            Err(failure) => {
                discard(docx_path);
                return Err(failure);
            }
        };

        fs::remove_file(docx_path).map_err(|e| ConvertFailure::Other(e.to_string()))?;
        Ok(pdf_path)
    }
}

enum ConvertFailure {
    Missing,
    Other(String),
}

fn discard(docx_path: &Path) {
    if let Err(e) = fs::remove_file(docx_path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Could not remove {}: {}", docx_path.display(), e);
        }
    }
}

fn fallback_name(number: usize) -> String {
    format!("Employee_{}", number)
}

/// Name used in status lines and file names: spaces become underscores.
pub fn employee_label(record: &Record, number: usize) -> String {
    record
        .text(fields::NAME)
        .unwrap_or_else(|| fallback_name(number))
        .replace(' ', "_")
}

/// `{employee}_Salary_Slip_{month}.docx`, safe for use as a single path segment.
pub fn payslip_filename(employee: &str, record: &Record) -> String {
    let month = record
        .text(fields::MONTH)
        .unwrap_or_else(|| "Payslip".to_string())
        .replace(' ', "_");
    sanitize_filename::sanitize(format!("{}_Salary_Slip_{}.docx", employee, month))
}
