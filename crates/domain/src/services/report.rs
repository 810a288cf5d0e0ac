//! Report assembly.
//!
//! Collects the per-application rows produced during a run and orders them
//! for rendering.

use serde::Serialize;

use crate::models::{
    AssignmentStatistic, DeploymentStatistic, DeviceInstallStatus, InstallDetail, ReportRow,
    Tagged,
};

/// Ordered output tables of one run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReport {
    /// Number of applications processed.
    pub application_count: usize,
    pub deployment_statistics: Vec<DeploymentStatistic>,
    pub assignment_statistics: Vec<AssignmentStatistic>,
    pub install_details: Vec<InstallDetail>,
}

/// Accumulates rows in processing order. No deduplication is performed.
#[derive(Debug, Default)]
pub struct ReportAssembler {
    application_count: usize,
    deployment_statistics: Vec<DeploymentStatistic>,
    assignment_statistics: Vec<AssignmentStatistic>,
    install_details: Vec<InstallDetail>,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_application(&mut self) {
        self.application_count += 1;
    }

    pub fn push_deployment(&mut self, statistic: DeploymentStatistic) {
        self.deployment_statistics.push(statistic);
    }

    pub fn push_assignment(&mut self, statistic: AssignmentStatistic) {
        self.assignment_statistics.push(statistic);
    }

    /// Adds detail rows for every record that is not `notApplicable`.
    pub fn push_details<'r, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'r Tagged<DeviceInstallStatus>>,
    {
        self.install_details.extend(
            records
                .into_iter()
                .filter(|tagged| tagged.record.install_state.is_applicable())
                .map(InstallDetail::from),
        );
    }

    /// Sorts every table by application name and returns the report.
    ///
    /// Ordering is ordinal (byte-wise, case-sensitive) and stable, so rows of
    /// applications sharing a name keep their listing order.
    pub fn finish(self) -> DeploymentReport {
        let mut report = DeploymentReport {
            application_count: self.application_count,
            deployment_statistics: self.deployment_statistics,
            assignment_statistics: self.assignment_statistics,
            install_details: self.install_details,
        };
        sort_by_app_name(&mut report.deployment_statistics);
        sort_by_app_name(&mut report.assignment_statistics);
        sort_by_app_name(&mut report.install_details);
        report
    }
}

fn sort_by_app_name<R: ReportRow>(rows: &mut [R]) {
    rows.sort_by(|a, b| a.app_name().cmp(b.app_name()));
}
