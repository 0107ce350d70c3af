//! DOCX package access.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::xml::{XmlDocument, XmlElement};
use super::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

/// An opened Word document held fully in memory.
///
/// Only the main document part is parsed; every other part is carried as
/// raw bytes and written back unchanged.
#[derive(Debug, Clone)]
pub struct DocxDocument {
    parts: Vec<(String, Vec<u8>)>,
    document: XmlDocument,
}

impl DocxDocument {
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().replace('\\', "/");
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            parts.push((name, data));
        }

        Self::from_parts(parts)
    }

    /// Assemble a document from named package parts, in archive order.
    pub fn from_parts(parts: Vec<(String, Vec<u8>)>) -> Result<Self, DocumentError> {
        let xml = parts
            .iter()
            .find(|(name, _)| name == DOCUMENT_PART)
            .map(|(_, data)| String::from_utf8_lossy(data).into_owned())
            .ok_or_else(|| DocumentError::MissingPart(DOCUMENT_PART.to_string()))?;
        let document = XmlDocument::parse(&xml)?;

        Ok(Self { parts, document })
    }

    /// `w:body` of the main document part.
    pub fn body(&self) -> Option<&XmlElement> {
        self.document.root.child("w:body")
    }

    pub fn body_mut(&mut self) -> Option<&mut XmlElement> {
        self.document.root.child_mut("w:body")
    }

    /// Write the package to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let document_xml = self.document.to_bytes()?;

        let file = File::create(path)?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in &self.parts {
            writer.start_file(name.as_str(), options)?;
            if name == DOCUMENT_PART {
                writer.write_all(&document_xml)?;
            } else {
                writer.write_all(data)?;
            }
        }

        writer.finish()?;
        Ok(())
    }
}
