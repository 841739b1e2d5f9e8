//! Persistence for label sheet templates.
//!
//! The remote document store is reached through the [`DocumentStore`] trait;
//! [`store::MemoryDocumentStore`] and [`store::HttpDocumentStore`] implement
//! it. [`repositories::TemplateRepo`] is the owner-scoped facade the rest of
//! the application talks to.

pub mod error;
pub mod models;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use store::{CollectionPath, Document, DocumentStore};
