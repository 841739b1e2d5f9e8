use labelsheet_core::error::CoreError;
use labelsheet_db::StoreError;
use labelsheet_identity::AuthError;

use crate::config::ConfigError;

/// Which store interaction a persistence failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Save,
    Delete,
}

/// Application-level error type.
///
/// Wraps [`CoreError`] for validation and form errors and adds the session
/// and persistence failures. [`AppError::user_message`] gives the text shown
/// to the user for each variant.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Neither the custom token nor anonymous sign-in produced a user.
    #[error("Bootstrap failed: {0}")]
    BootstrapFailed(#[source] AuthError),

    /// A domain-level error from `labelsheet_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The document store refused or could not complete an operation.
    #[error("Persistence failed during {operation:?}: {source}")]
    PersistenceFailed {
        operation: Operation,
        #[source]
        source: StoreError,
    },

    /// An operation needs a user but the session is signed out.
    #[error("No user is signed in")]
    NotSignedIn,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience type alias for manager return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn persistence(operation: Operation, source: StoreError) -> Self {
        Self::PersistenceFailed { operation, source }
    }

    /// Whether the user can recover by correcting input or retrying.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::BootstrapFailed(_) | Self::Config(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            AppError::BootstrapFailed(_) => {
                "Could not sign in a user for the application.".to_string()
            }
            AppError::Core(core) => match core {
                CoreError::ValidationFailed(_) => {
                    "Please fill in all fields with valid, positive values.".to_string()
                }
                CoreError::InvalidDimension { .. } => {
                    "Please enter a valid width and height for the custom page size.".to_string()
                }
                CoreError::NotFound { entity, .. } => format!("That {entity} no longer exists."),
                CoreError::SubmissionInFlight => {
                    "A save is already in progress, please wait.".to_string()
                }
            },
            AppError::PersistenceFailed { operation, .. } => match operation {
                Operation::Load => "Something went wrong while loading templates.",
                Operation::Save => "Something went wrong while saving the template.",
                Operation::Delete => "Something went wrong while deleting the template.",
            }
            .to_string(),
            AppError::NotSignedIn => "Please wait until sign-in has completed.".to_string(),
            AppError::Config(err) => format!("Configuration problem: {err}"),
        }
    }
}
