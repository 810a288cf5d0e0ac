//! Derived per-application statistics and the rows handed to report writers.

use serde::Serialize;

use super::install_status::DeviceInstallStatus;
use super::mobile_app::Tagged;
use crate::services::classifier::AppType;

/// Cell shown for sums that were not computed.
pub const NOT_COMPUTED: &str = "-";

/// A row in one of the output tables.
///
/// Renderers only see headers and string cells, so CSV and HTML output share
/// one column definition.
pub trait ReportRow {
    fn headers() -> &'static [&'static str];

    fn cells(&self) -> Vec<String>;

    /// Key the assembled table is sorted by.
    fn app_name(&self) -> &str;
}

/// Device-oriented outcome counts for one application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatistic {
    pub app_name: String,
    pub app_type: AppType,
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub not_installed: u64,
    pub success_rate: String,
    pub failure_rate: String,
}

impl ReportRow for DeploymentStatistic {
    fn headers() -> &'static [&'static str] {
        &[
            "App Name",
            "App Type",
            "Succeeded",
            "Failed",
            "Not Installed",
            "Total",
            "Success Rate",
            "Failure Rate",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.app_name.clone(),
            self.app_type.to_string(),
            self.succeeded.to_string(),
            self.failed.to_string(),
            self.not_installed.to_string(),
            self.total.to_string(),
            self.success_rate.clone(),
            self.failure_rate.clone(),
        ]
    }

    fn app_name(&self) -> &str {
        &self.app_name
    }
}

/// Per-user device counts summed over all user records of an application.
///
/// `NotComputed` is distinct from a true zero: it means the application had
/// no user records at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "state")]
pub enum DeviceSums {
    NotComputed,
    Computed {
        installed: u64,
        failed: u64,
        not_installed: u64,
    },
}

impl DeviceSums {
    fn cell(value: Option<u64>) -> String {
        value.map_or_else(|| NOT_COMPUTED.to_string(), |v| v.to_string())
    }

    pub fn installed(&self) -> Option<u64> {
        match self {
            Self::Computed { installed, .. } => Some(*installed),
            Self::NotComputed => None,
        }
    }

    pub fn failed(&self) -> Option<u64> {
        match self {
            Self::Computed { failed, .. } => Some(*failed),
            Self::NotComputed => None,
        }
    }

    pub fn not_installed(&self) -> Option<u64> {
        match self {
            Self::Computed { not_installed, .. } => Some(*not_installed),
            Self::NotComputed => None,
        }
    }
}

/// User-oriented assignment outcome for one application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentStatistic {
    pub app_name: String,
    pub app_type: AppType,
    pub assigned_user_count: u64,
    pub deployed_user_total: u64,
    pub device_sums: DeviceSums,
}

impl ReportRow for AssignmentStatistic {
    fn headers() -> &'static [&'static str] {
        &[
            "App Name",
            "App Type",
            "Assigned Users",
            "Deployed Total",
            "Installed Devices",
            "Failed Devices",
            "Not Installed Devices",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.app_name.clone(),
            self.app_type.to_string(),
            self.assigned_user_count.to_string(),
            self.deployed_user_total.to_string(),
            DeviceSums::cell(self.device_sums.installed()),
            DeviceSums::cell(self.device_sums.failed()),
            DeviceSums::cell(self.device_sums.not_installed()),
        ]
    }

    fn app_name(&self) -> &str {
        &self.app_name
    }
}

/// Flat audit row underlying the device statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallDetail {
    pub app_name: String,
    pub app_type: AppType,
    pub user_principal_name: String,
    pub user_name: String,
    pub os_description: String,
    pub os_version: String,
    pub install_status: String,
    pub error_code: String,
    pub last_sync_date_time: String,
    pub device_name: String,
    pub device_id: String,
}

impl From<&Tagged<DeviceInstallStatus>> for InstallDetail {
    fn from(tagged: &Tagged<DeviceInstallStatus>) -> Self {
        let status = &tagged.record;
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            app_name: tagged.app.app_name.clone(),
            app_type: tagged.app.app_type,
            user_principal_name: text(&status.user_principal_name),
            user_name: text(&status.user_name),
            os_description: text(&status.os_description),
            os_version: text(&status.os_version),
            install_status: status.install_state.to_string(),
            error_code: status
                .error_code
                .map(|code| code.to_string())
                .unwrap_or_default(),
            last_sync_date_time: status
                .last_sync_date_time
                .map(|ts| ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
                .unwrap_or_default(),
            device_name: text(&status.device_name),
            device_id: text(&status.device_id),
        }
    }
}

impl ReportRow for InstallDetail {
    fn headers() -> &'static [&'static str] {
        &[
            "App Name",
            "App Type",
            "User Principal Name",
            "User Name",
            "OS Description",
            "OS Version",
            "Install Status",
            "Error Code",
            "Last Sync",
            "Device Name",
            "Device ID",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.app_name.clone(),
            self.app_type.to_string(),
            self.user_principal_name.clone(),
            self.user_name.clone(),
            self.os_description.clone(),
            self.os_version.clone(),
            self.install_status.clone(),
            self.error_code.clone(),
            self.last_sync_date_time.clone(),
            self.device_name.clone(),
            self.device_id.clone(),
        ]
    }

    fn app_name(&self) -> &str {
        &self.app_name
    }
}
