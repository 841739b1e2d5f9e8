//! Stored document shapes.

pub mod template;
