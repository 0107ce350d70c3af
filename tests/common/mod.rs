#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use payslip_generator_server::batch::PayslipBatch;
use payslip_generator_server::config::PayslipConfig;
use payslip_generator_server::delivery::{MailError, Mailer, OutgoingMail};
use payslip_generator_server::document::{
    pdf_path_for, ConversionError, DocumentConverter, DocxDocument,
};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

pub const JANE_DOE_CSV: &str = "Name,Email,Salary,Actual_Payable_Days,Loss_of_PayDays,Allowances,Bonus,PF,PT,TDS,Arrears,Send_Mail\n\
Jane Doe,jane@example.com,30000,30,0,1000,0,500,100,0,0,no\n";

/// Write a minimal DOCX whose body holds one paragraph per entry.
pub fn write_template(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|text| format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let docx = DocxDocument::from_parts(vec![
        ("[Content_Types].xml".to_string(), CONTENT_TYPES.as_bytes().to_vec()),
        ("word/document.xml".to_string(), document.into_bytes()),
    ])
    .expect("template parts are valid");
    docx.save(path).expect("template is writable");
}

/// Visible body text of a saved document, one line per paragraph.
pub fn document_text(path: &Path) -> String {
    let docx = DocxDocument::open(path).expect("document opens");
    docx.body()
        .expect("document has a body")
        .elements()
        .filter(|e| e.is("w:p"))
        .map(|p| p.text())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converter that copies the DOCX to its `.pdf` path, so the "PDF" can be
/// inspected as a document. Clones share the conversion log.
#[derive(Clone, Default)]
pub struct CopyingConverter {
    pub converted: Arc<Mutex<Vec<PathBuf>>>,
}

impl DocumentConverter for CopyingConverter {
    fn convert(&self, source: &Path) -> Result<PathBuf, ConversionError> {
        let target = pdf_path_for(source);
        fs::copy(source, &target).map_err(|e| ConversionError::Launch {
            program: "copy".to_string(),
            source: e,
        })?;
        self.converted.lock().push(source.to_path_buf());
        Ok(target)
    }
}

/// Converter that reports success without producing any output.
pub struct SilentConverter;

impl DocumentConverter for SilentConverter {
    fn convert(&self, source: &Path) -> Result<PathBuf, ConversionError> {
        Err(ConversionError::OutputMissing(pdf_path_for(source)))
    }
}

/// Converter whose tool exits with an error for files starting with `fail_for`.
pub struct FailingConverter {
    pub fail_for: &'static str,
    pub inner: CopyingConverter,
}

impl DocumentConverter for FailingConverter {
    fn convert(&self, source: &Path) -> Result<PathBuf, ConversionError> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if name.starts_with(self.fail_for) {
            return Err(ConversionError::ToolExit(77));
        }
        self.inner.convert(source)
    }
}

/// Copying converter that holds each conversion open briefly and records the
/// highest number of conversions seen in flight at once.
#[derive(Clone, Default)]
pub struct OverlapConverter {
    pub inner: CopyingConverter,
    in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

impl DocumentConverter for OverlapConverter {
    fn convert(&self, source: &Path) -> Result<PathBuf, ConversionError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        let result = self.inner.convert(source);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Mailer that records every message. Clones share the outbox.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<OutgoingMail>>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("connection refused".to_string()));
        }
        self.sent.lock().push(mail.clone());
        Ok(())
    }
}

/// Scratch workspace with a template and both output directories.
pub struct Workspace {
    pub dir: tempfile::TempDir,
    pub config: PayslipConfig,
}

impl Workspace {
    pub fn new(paragraphs: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let template_path = dir.path().join("payslip_template.docx");
        write_template(&template_path, paragraphs);

        let config = PayslipConfig {
            template_path,
            output_dir: dir.path().join("generated_payslips"),
            not_sent_dir: dir.path().join("not_sent_payslips"),
            ..PayslipConfig::default()
        };

        Self { dir, config }
    }

    pub fn batch(
        &self,
        converter: impl DocumentConverter + 'static,
        mailer: impl Mailer + 'static,
    ) -> PayslipBatch {
        PayslipBatch::new(self.config.clone(), Box::new(converter), Box::new(mailer))
    }
}
