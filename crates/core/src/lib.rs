//! Domain logic for label sheet templates.
//!
//! Everything in this crate is pure: page geometry, template validation, the
//! edit/create form state machine and the transient notice timer. Persistence
//! and identity live in `labelsheet-db` and `labelsheet-identity`.

pub mod error;
pub mod form;
pub mod geometry;
pub mod notice;
pub mod template;
pub mod types;
pub mod validation;
