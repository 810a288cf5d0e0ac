//! Per-application aggregation of install status records.

use crate::models::{
    AssignmentStatistic, DeploymentStatistic, DeviceInstallStatus, DeviceSums, InstallState,
    UserInstallStatus,
};
use crate::services::classifier::AppType;

/// Rate reported when there is nothing to divide by.
pub const ZERO_RATE: &str = "0.00%";

/// Formats `part / total` as a percentage rounded half away from zero to two
/// decimals, or [`ZERO_RATE`] when `total` is zero.
pub fn format_rate(part: u64, total: u64) -> String {
    if total == 0 {
        return ZERO_RATE.to_string();
    }
    // Hundredths of a percent, rounded half up in integer arithmetic.
    let (part, total) = (u128::from(part), u128::from(total));
    let hundredths = (part * 20_000 + total) / (2 * total);
    format!("{}.{:02}%", hundredths / 100, hundredths % 100)
}

/// Folds one application's device records into outcome counts and rates.
///
/// `notApplicable` records are left out of every count, including `total`.
pub fn aggregate_device_stats<'r, I>(
    app_name: &str,
    app_type: AppType,
    records: I,
) -> DeploymentStatistic
where
    I: IntoIterator<Item = &'r DeviceInstallStatus>,
{
    let mut total = 0u64;
    let mut succeeded = 0u64;
    let mut failed = 0u64;
    let mut not_installed = 0u64;

    for record in records {
        match record.install_state {
            InstallState::NotApplicable => continue,
            InstallState::Installed => succeeded += 1,
            InstallState::Failed => failed += 1,
            InstallState::NotInstalled => not_installed += 1,
            InstallState::Other(_) => {}
        }
        total += 1;
    }

    DeploymentStatistic {
        app_name: app_name.to_string(),
        app_type,
        total,
        succeeded,
        failed,
        not_installed,
        success_rate: format_rate(succeeded, total),
        failure_rate: format_rate(failed, total),
    }
}

/// Folds one application's user records and its assigned-user count.
///
/// Every user record counts towards `deployed_user_total`; the device sums are
/// only computed when there is at least one record.
pub fn aggregate_user_stats<'r, I>(
    app_name: &str,
    app_type: AppType,
    records: I,
    assigned_user_count: u64,
) -> AssignmentStatistic
where
    I: IntoIterator<Item = &'r UserInstallStatus>,
{
    let mut deployed_user_total = 0u64;
    let mut installed = 0u64;
    let mut failed = 0u64;
    let mut not_installed = 0u64;

    for record in records {
        deployed_user_total += 1;
        installed += record.installed_device_count;
        failed += record.failed_device_count;
        not_installed += record.not_installed_device_count;
    }

    let device_sums = if deployed_user_total > 0 {
        DeviceSums::Computed {
            installed,
            failed,
            not_installed,
        }
    } else {
        DeviceSums::NotComputed
    };

    AssignmentStatistic {
        app_name: app_name.to_string(),
        app_type,
        assigned_user_count,
        deployed_user_total,
        device_sums,
    }
}
