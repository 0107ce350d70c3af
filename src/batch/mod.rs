//! Batch processing of uploaded payroll files.

pub mod orchestrator;

pub use orchestrator::{employee_label, payslip_filename, PayslipBatch};
