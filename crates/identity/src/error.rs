#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The custom token failed signature, expiry or claim checks.
    #[error("Invalid sign-in token: {0}")]
    InvalidToken(String),

    /// The provider cannot be reached or is not configured for this method.
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    /// The provider refused the sign-in.
    #[error("Sign-in rejected: {0}")]
    Rejected(String),
}
