//! Pipeline driver.
//!
//! Lists applications, then processes them one at a time in listing order:
//!
//! 1. device branch: fetch device statuses, aggregate, collect detail rows
//! 2. user branch: fetch user statuses, fetch group assignments, resolve
//!    assigned users per group, aggregate
//!
//! The run mode decides which branches execute. The first fetch failure
//! aborts the run and no report is produced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FetchError;
use crate::models::MobileApp;
use crate::services::aggregation::{aggregate_device_stats, aggregate_user_stats};
use crate::services::membership::{MembershipResolver, DEFAULT_NESTED_GROUP_DEPTH};
use crate::services::report::{DeploymentReport, ReportAssembler};
use crate::services::source::GraphSource;
use crate::services::status_fetcher::StatusFetcher;

/// Which classes of status data a run fetches and aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Device,
    User,
    #[default]
    UserAndDevice,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::User => "user",
            Self::UserAndDevice => "useranddevice",
        }
    }

    pub fn includes_devices(&self) -> bool {
        matches!(self, Self::Device | Self::UserAndDevice)
    }

    /// User runs also resolve group memberships, the most expensive step.
    pub fn includes_users(&self) -> bool {
        matches!(self, Self::User | Self::UserAndDevice)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "device" => Ok(Self::Device),
            "user" => Ok(Self::User),
            "useranddevice" => Ok(Self::UserAndDevice),
            _ => Err(format!(
                "Invalid run mode: {} (expected device, user or useranddevice)",
                s
            )),
        }
    }
}

/// Options for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub run_mode: RunMode,
    pub nested_group_depth: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            run_mode: RunMode::default(),
            nested_group_depth: DEFAULT_NESTED_GROUP_DEPTH,
        }
    }
}

impl PipelineOptions {
    pub fn new(run_mode: RunMode, nested_group_depth: u32) -> Result<Self, String> {
        shared::validation::validate_nested_group_depth(nested_group_depth)
            .map_err(|e| e.message.map(|m| m.to_string()).unwrap_or_default())?;
        Ok(Self {
            run_mode,
            nested_group_depth,
        })
    }
}

/// Drives one pass over the application inventory.
pub struct DeploymentPipeline<'a, S: GraphSource + ?Sized> {
    fetcher: StatusFetcher<'a, S>,
    resolver: MembershipResolver<'a, S>,
    options: PipelineOptions,
}

impl<'a, S: GraphSource + ?Sized> DeploymentPipeline<'a, S> {
    pub fn new(source: &'a S, options: PipelineOptions) -> Self {
        Self {
            fetcher: StatusFetcher::new(source),
            resolver: MembershipResolver::new(source, options.nested_group_depth),
            options,
        }
    }

    pub async fn run(&self) -> Result<DeploymentReport, FetchError> {
        tracing::info!(
            run_mode = %self.options.run_mode,
            nested_group_depth = self.options.nested_group_depth,
            "Starting deployment status run"
        );

        let apps = self.fetcher.list_applications().await?;
        let mut assembler = ReportAssembler::new();

        for (index, app) in apps.iter().enumerate() {
            if let Err(e) = self.process_application(app, &mut assembler).await {
                tracing::warn!(
                    app_id = %app.id,
                    app_name = %app.display_name,
                    position = index + 1,
                    of = apps.len(),
                    "Aborting run"
                );
                return Err(e);
            }
        }

        let report = assembler.finish();
        tracing::info!(
            applications = report.application_count,
            deployment_rows = report.deployment_statistics.len(),
            assignment_rows = report.assignment_statistics.len(),
            detail_rows = report.install_details.len(),
            "Deployment status run completed"
        );
        Ok(report)
    }

    async fn process_application(
        &self,
        app: &MobileApp,
        assembler: &mut ReportAssembler,
    ) -> Result<(), FetchError> {
        let app_type = app.app_type();
        tracing::info!(
            app_id = %app.id,
            app_name = %app.display_name,
            app_type = %app_type,
            "Processing application"
        );

        if self.options.run_mode.includes_devices() {
            let statuses = self.fetcher.fetch_device_statuses(app).await?;
            let statistic = aggregate_device_stats(
                &app.display_name,
                app_type,
                statuses.iter().map(|tagged| &tagged.record),
            );
            assembler.push_deployment(statistic);
            assembler.push_details(&statuses);
        }

        if self.options.run_mode.includes_users() {
            let statuses = self.fetcher.fetch_user_statuses(app).await?;
            let assignments = self.fetcher.fetch_group_assignments(&app.id).await?;

            let mut assigned_users = 0u64;
            for group_id in assignments
                .iter()
                .filter_map(|assignment| assignment.target_group_id.as_deref())
            {
                assigned_users += self.resolver.resolve_assigned_user_count(group_id).await?;
            }

            let statistic = aggregate_user_stats(
                &app.display_name,
                app_type,
                statuses.iter().map(|tagged| &tagged.record),
                assigned_users,
            );
            assembler.push_assignment(statistic);
        }

        assembler.record_application();
        Ok(())
    }
}

/// Runs the pipeline against `source` with the given options.
pub async fn run_pipeline<S: GraphSource + ?Sized>(
    source: &S,
    options: PipelineOptions,
) -> Result<DeploymentReport, FetchError> {
    DeploymentPipeline::new(source, options).run().await
}
