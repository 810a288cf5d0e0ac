//! Install status records reported per device and per user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Install outcome reported by the remote system.
///
/// Values outside the four counted states pass through unchanged so the
/// detail export shows exactly what the service reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstallState {
    Installed,
    Failed,
    NotInstalled,
    NotApplicable,
    Other(String),
}

impl InstallState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Installed => "installed",
            Self::Failed => "failed",
            Self::NotInstalled => "notInstalled",
            Self::NotApplicable => "notApplicable",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }
}

impl From<String> for InstallState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "installed" => Self::Installed,
            "failed" => Self::Failed,
            "notInstalled" => Self::NotInstalled,
            "notApplicable" => Self::NotApplicable,
            _ => Self::Other(raw),
        }
    }
}

impl From<InstallState> for String {
    fn from(state: InstallState) -> Self {
        state.as_str().to_string()
    }
}

impl Default for InstallState {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `mobileApps/{id}/deviceStatuses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInstallStatus {
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
    #[serde(default)]
    pub os_description: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub install_state: InstallState,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub last_sync_date_time: Option<DateTime<Utc>>,
}

/// One entry of `mobileApps/{id}/userStatuses`.
///
/// Device counts are pre-aggregated per user by the remote system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInstallStatus {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
    #[serde(default)]
    pub installed_device_count: u64,
    #[serde(default)]
    pub failed_device_count: u64,
    #[serde(default)]
    pub not_installed_device_count: u64,
}
