//! Microsoft Graph transport for the deployment status report.
//!
//! This crate provides:
//! - OAuth2 client-credentials token acquisition with an in-memory token cache
//! - `GraphClient`, the HTTP implementation of the domain `GraphSource` seam

pub mod auth;
pub mod client;

pub use auth::{AuthConfig, AuthError, ClientCredentialsAuthenticator, StaticToken, TokenProvider};
pub use client::{GraphClient, GraphClientConfig};
