//! Label sheet template manager.
//!
//! Exposes configuration, session bootstrap, the [`manager::TemplateManager`]
//! and the line-oriented console so integration tests and the binary
//! entrypoint can both use them.

pub mod bootstrap;
pub mod config;
pub mod console;
pub mod error;
pub mod manager;
