use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use domain::services::{run_pipeline, DeploymentReport, GraphSource, RunMode};
use graph::{
    AuthConfig, ClientCredentialsAuthenticator, GraphClient, GraphClientConfig, TokenProvider,
};
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::services::ReportWriter;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_mode: RunMode,
    pub application_count: usize,
    pub deployment_rows: usize,
    pub assignment_rows: usize,
    pub detail_rows: usize,
    pub written: Vec<PathBuf>,
}

impl RunSummary {
    fn new(run_mode: RunMode, report: &DeploymentReport, written: Vec<PathBuf>) -> Self {
        Self {
            run_mode,
            application_count: report.application_count,
            deployment_rows: report.deployment_statistics.len(),
            assignment_rows: report.assignment_statistics.len(),
            detail_rows: report.install_details.len(),
            written,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Processed {} applications ({} mode)",
            self.application_count, self.run_mode
        )?;
        if self.run_mode.includes_devices() {
            writeln!(
                f,
                "  deployment statistics: {} rows, install details: {} rows",
                self.deployment_rows, self.detail_rows
            )?;
        }
        if self.run_mode.includes_users() {
            writeln!(f, "  assignment statistics: {} rows", self.assignment_rows)?;
        }
        for path in &self.written {
            writeln!(f, "  wrote {}", path.display())?;
        }
        Ok(())
    }
}

fn auth_config(config: &Config) -> AuthConfig {
    AuthConfig {
        tenant_id: config.azure.tenant_id.clone(),
        client_id: config.azure.client_id.clone(),
        client_secret: config.azure.client_secret.clone(),
        authority_host: config.azure.authority_host.clone(),
        scope: config.azure.scope.clone(),
        timeout: config.request_timeout(),
    }
}

/// Authenticates, runs the pipeline against Microsoft Graph and writes the
/// report files.
pub async fn run(config: &Config) -> Result<RunSummary, AppError> {
    config.validate()?;

    let authenticator = Arc::new(ClientCredentialsAuthenticator::new(auth_config(config))?);
    // Fail on bad credentials before any resource is requested.
    authenticator.access_token().await?;

    let client = GraphClient::new(
        GraphClientConfig {
            base_url: config.graph.base_url.clone(),
            timeout: config.request_timeout(),
        },
        authenticator,
    )?;

    run_with_source(&client, config).await
}

/// Runs the pipeline against an arbitrary source and writes the report files.
///
/// Nothing is written when the pipeline fails.
pub async fn run_with_source<S: GraphSource + ?Sized>(
    source: &S,
    config: &Config,
) -> Result<RunSummary, AppError> {
    let options = config.pipeline_options();
    let report = run_pipeline(source, options).await?;

    let writer = ReportWriter::new(
        config.report.output_dir.clone(),
        config.report.formats.clone(),
    );
    let written = writer.write(&report, options.run_mode)?;

    info!(files = written.len(), "Reports written");
    Ok(RunSummary::new(options.run_mode, &report, written))
}
