//! Shared utilities for the deployment report workspace.
//!
//! This crate provides common functionality used across the other crates:
//! - Validation of directory (tenant) and application (client) identifiers
//! - Bounds checks for pipeline tuning values

pub mod validation;
