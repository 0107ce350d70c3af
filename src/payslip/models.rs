use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of a batch: one line per processed record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusReport {
    pub status_messages: Vec<String>,
}

/// Multipart form accepted by the generate endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PayslipUploadForm {
    /// Payroll CSV with one employee per row
    #[allow(unused)]
    #[schema(value_type = String, format = Binary)]
    pub csv_file: Vec<u8>,
    /// Access token, when not sent as a Bearer header
    #[allow(unused)]
    pub token: Option<String>,
}
