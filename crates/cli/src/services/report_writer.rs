//! Report file writing.
//!
//! Renders the assembled tables as CSV and/or HTML files in the output
//! directory. Which tables are written depends on the run mode.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use domain::models::{AssignmentStatistic, DeploymentStatistic, InstallDetail, ReportRow};
use domain::services::{DeploymentReport, RunMode};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub const DEPLOYMENT_STATISTICS_FILE: &str = "AppDeploymentStatistics";
pub const ASSIGNMENT_STATISTICS_FILE: &str = "AppAssignmentStatistics";
pub const INSTALL_DETAILS_FILE: &str = "AppInstallDetails";

/// Report writing errors.
#[derive(Error, Debug)]
pub enum ReportWriterError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV output was not valid UTF-8")]
    Encoding,
}

/// Report format types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Csv,
    Html,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "html" => Ok(ReportFormat::Html),
            _ => Err(format!("Invalid report format: {} (expected csv or html)", s)),
        }
    }
}

/// Writes report tables to files.
pub struct ReportWriter {
    output_dir: PathBuf,
    formats: Vec<ReportFormat>,
}

impl ReportWriter {
    pub fn new(output_dir: PathBuf, formats: Vec<ReportFormat>) -> Self {
        Self {
            output_dir,
            formats,
        }
    }

    /// Writes every table the run mode produced, in every configured format.
    ///
    /// Returns the written paths.
    pub fn write(
        &self,
        report: &DeploymentReport,
        run_mode: RunMode,
    ) -> Result<Vec<PathBuf>, ReportWriterError> {
        fs::create_dir_all(&self.output_dir)?;

        let mut written = Vec::new();
        if run_mode.includes_devices() {
            written.extend(self.write_table::<DeploymentStatistic>(
                DEPLOYMENT_STATISTICS_FILE,
                "App Deployment Statistics",
                &report.deployment_statistics,
            )?);
            written.extend(self.write_table::<InstallDetail>(
                INSTALL_DETAILS_FILE,
                "App Install Details",
                &report.install_details,
            )?);
        }
        if run_mode.includes_users() {
            written.extend(self.write_table::<AssignmentStatistic>(
                ASSIGNMENT_STATISTICS_FILE,
                "App Assignment Statistics",
                &report.assignment_statistics,
            )?);
        }

        Ok(written)
    }

    fn write_table<R: ReportRow>(
        &self,
        base_name: &str,
        title: &str,
        rows: &[R],
    ) -> Result<Vec<PathBuf>, ReportWriterError> {
        let mut written = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let content = match format {
                ReportFormat::Csv => render_csv(rows)?,
                ReportFormat::Html => render_html(title, rows),
            };
            let path = self
                .output_dir
                .join(format!("{}.{}", base_name, format.extension()));
            write_file(&path, &content)?;
            info!(path = %path.display(), rows = rows.len(), "Report written");
            written.push(path);
        }
        Ok(written)
    }
}

/// Renders rows as CSV with a header line.
pub fn render_csv<R: ReportRow>(rows: &[R]) -> Result<String, ReportWriterError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(R::headers())?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportWriterError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|_| ReportWriterError::Encoding)
}

/// Renders rows as a standalone HTML document with one table.
pub fn render_html<R: ReportRow>(title: &str, rows: &[R]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str(concat!(
        "<style>\n",
        "body { font-family: Segoe UI, Arial, sans-serif; margin: 2em; }\n",
        "table { border-collapse: collapse; }\n",
        "th, td { border: 1px solid #c8c8c8; padding: 4px 10px; text-align: left; }\n",
        "th { background: #0078d4; color: #fff; }\n",
        "tr:nth-child(even) td { background: #f3f3f3; }\n",
        "</style>\n</head>\n<body>\n",
    ));
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));
    html.push_str(&format!(
        "<p>Generated {} &middot; {} rows</p>\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        rows.len()
    ));

    html.push_str("<table>\n<thead>\n<tr>");
    for header in R::headers() {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in row.cells() {
            html.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn write_file(path: &Path, content: &str) -> Result<(), ReportWriterError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
