//! DOCX to PDF conversion through an external office suite.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to run converter {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("converter exited with status {0}")]
    ToolExit(i32),
    #[error("converted file {} was not produced", .0.display())]
    OutputMissing(PathBuf),
}

/// Turns an editable document into a fixed-layout PDF next to it.
pub trait DocumentConverter: Send + Sync {
    /// Convert `source`, returning the path of the produced PDF.
    fn convert(&self, source: &Path) -> Result<PathBuf, ConversionError>;
}

/// Path of the PDF produced for `source`: same directory and base name.
pub fn pdf_path_for(source: &Path) -> PathBuf {
    source.with_extension("pdf")
}

/// Converter backed by LibreOffice's headless mode.
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    program: PathBuf,
}

impl LibreOfficeConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl DocumentConverter for LibreOfficeConverter {
    fn convert(&self, source: &Path) -> Result<PathBuf, ConversionError> {
        let target = pdf_path_for(source);
        let out_dir = match source.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg(source)
            .arg("--outdir")
            .arg(out_dir)
            .output()
            .map_err(|source| ConversionError::Launch {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            log::error!(
                "Converter exited with status {} for {}: {}",
                code,
                source.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(ConversionError::ToolExit(code));
        }

        if !target.exists() {
            return Err(ConversionError::OutputMissing(target));
        }

        log::debug!("Converted {} to {}", source.display(), target.display());
        Ok(target)
    }
}
