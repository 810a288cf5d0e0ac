//! Services for the deployment report binary.

pub mod report_writer;

pub use report_writer::{ReportFormat, ReportWriter, ReportWriterError};
