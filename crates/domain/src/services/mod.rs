//! Domain services for the deployment status report.
//!
//! Services contain the aggregation logic that operates on domain models.

pub mod aggregation;
pub mod classifier;
pub mod membership;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod status_fetcher;

pub use aggregation::{aggregate_device_stats, aggregate_user_stats, format_rate, ZERO_RATE};
pub use classifier::{classify, AppType};
pub use membership::{MembershipResolver, DEFAULT_NESTED_GROUP_DEPTH};
pub use pipeline::{run_pipeline, DeploymentPipeline, PipelineOptions, RunMode};
pub use report::{DeploymentReport, ReportAssembler};
pub use source::{resources, GraphSource, InMemoryGraphSource};
pub use status_fetcher::StatusFetcher;
