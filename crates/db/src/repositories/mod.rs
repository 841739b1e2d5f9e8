//! Owner-scoped repositories over the document store.

pub mod template_repo;

pub use template_repo::{Synced, TemplateRepo};
