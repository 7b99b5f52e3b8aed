use thiserror::Error;

use crate::common::ValidationErrors;
use crate::kernel::AuthProviderError;

/// Account, login and onboarding failures
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("This email is already in use")]
    EmailInUse,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("No profile data found for this user")]
    ProfileNotFound,

    /// The profile has no recognizable role; the client can only log out
    #[error("This user has no role assigned")]
    RoleMissing,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Auth provider error: {0}")]
    Provider(anyhow::Error),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<AuthProviderError> for AccountError {
    fn from(error: AuthProviderError) -> Self {
        match error {
            AuthProviderError::EmailExists => AccountError::EmailInUse,
            AuthProviderError::InvalidCredentials => AccountError::InvalidCredentials,
            AuthProviderError::WeakPassword(reason) => {
                let mut errors = ValidationErrors::new();
                errors.push("password", reason);
                AccountError::Validation(errors)
            }
            AuthProviderError::Other(e) => AccountError::Provider(e),
        }
    }
}
