//! User identity for the template manager.
//!
//! [`IdentityProvider`] is the seam to whatever signs users in. The
//! [`hub::IdentityHub`] fans identity changes out to subscribers, and
//! [`local::LocalIdentityProvider`] is a self-contained provider that mints
//! anonymous ids and accepts HS256-signed custom tokens.

pub mod error;
pub mod hub;
pub mod local;
pub mod provider;

pub use error::AuthError;
pub use hub::{IdentityHub, Subscription};
pub use local::LocalIdentityProvider;
pub use provider::{IdentityHandler, IdentityProvider, IdentityState};
