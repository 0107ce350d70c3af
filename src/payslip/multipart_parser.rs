use actix_multipart::{Field, Multipart};
use actix_web::HttpResponse;
use futures_util::StreamExt;

use crate::ErrorResponse;

/// Parts of a payslip upload form.
#[derive(Debug, Default)]
pub struct PayslipUpload {
    pub csv_file: Option<Vec<u8>>,
    pub filename: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::FieldError(_) | MultipartParseError::Utf8Error(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!("{}", error)))
            }
            MultipartParseError::IoError(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("{}", error))),
        }
    }
}

pub struct MultipartParser;

impl MultipartParser {
    /// Collect the `csv_file` and `token` parts; other parts are skipped.
    pub async fn parse_payslip_upload(
        mut multipart: Multipart,
    ) -> Result<PayslipUpload, MultipartParseError> {
        let mut upload = PayslipUpload::default();

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
            let content_disposition = field.content_disposition().ok_or_else(|| {
                MultipartParseError::FieldError("Content disposition not found".to_string())
            })?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .to_string();
            let filename = content_disposition
                .get_filename()
                .map(|f| sanitize_filename::sanitize(f));

            match name.as_str() {
                "csv_file" => {
                    upload.csv_file = Some(read_field(&mut field).await?);
                    upload.filename = filename;
                }
                "token" => {
                    let bytes = read_field(&mut field).await?;
                    let value = String::from_utf8(bytes)
                        .map_err(|e| MultipartParseError::Utf8Error(e.to_string()))?;
                    let value = value.trim();
                    if !value.is_empty() {
                        upload.token = Some(value.to_string());
                    }
                }
                _ => {
                    // drain unknown parts so the stream can advance
                    read_field(&mut field).await?;
                }
            }
        }

        Ok(upload)
    }
}

async fn read_field(field: &mut Field) -> Result<Vec<u8>, MultipartParseError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
        buffer.extend_from_slice(&data);
    }
    Ok(buffer)
}
