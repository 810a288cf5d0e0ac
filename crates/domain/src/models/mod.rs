//! Domain models for the deployment status report.

pub mod group_membership;
pub mod install_status;
pub mod mobile_app;
pub mod statistics;

pub use group_membership::{GroupAssignment, GroupMember, MemberType};
pub use install_status::{DeviceInstallStatus, InstallState, UserInstallStatus};
pub use mobile_app::{AppTag, MobileApp, Tagged};
pub use statistics::{
    AssignmentStatistic, DeploymentStatistic, DeviceSums, InstallDetail, ReportRow,
};
