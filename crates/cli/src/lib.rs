pub mod app;
pub mod args;
pub mod config;
pub mod error;
pub mod logging;
pub mod services;
