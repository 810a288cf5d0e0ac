//! Command-line arguments.
//!
//! Flags override values from config files and the environment.

use clap::Parser;
use domain::services::RunMode;
use std::path::PathBuf;

use crate::services::report_writer::ReportFormat;

/// Report application deployment status from Intune
#[derive(Parser, Debug)]
#[command(name = "deployment-report")]
#[command(about = "Aggregate Intune app install status into deployment reports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Which status data to collect: device, user or useranddevice
    #[arg(short, long)]
    pub mode: Option<RunMode>,

    /// Directory the report files are written to
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Report format (csv, html); repeat for several
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub formats: Vec<ReportFormat>,

    /// Levels of nested groups expanded when counting assigned users
    #[arg(long, value_name = "N")]
    pub depth: Option<u32>,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unset() {
        let cli = Cli::parse_from(["deployment-report"]);
        assert!(cli.mode.is_none());
        assert!(cli.output.is_none());
        assert!(cli.formats.is_empty());
        assert!(cli.depth.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_mode_case_insensitive() {
        let cli = Cli::parse_from(["deployment-report", "-m", "UserAndDevice"]);
        assert_eq!(cli.mode, Some(RunMode::UserAndDevice));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let result = Cli::try_parse_from(["deployment-report", "--mode", "everything"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_format() {
        let result = Cli::try_parse_from(["deployment-report", "--format", "xlsx"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_count() {
        let cli = Cli::parse_from(["deployment-report", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
