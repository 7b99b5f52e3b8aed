//! Login action

use tracing::{debug, error, warn};

use super::Session;
use crate::domains::auth::models::LoginInput;
use crate::domains::auth::AccountError;
use crate::kernel::ServerDeps;

/// Sign in with the provider and load the stored profile.
///
/// The role comes from `user_type`, falling back to the legacy `role` field.
pub async fn login(input: LoginInput, deps: &ServerDeps) -> Result<Session, AccountError> {
    let (email, password) = input.validate()?;

    let identity = deps.auth.sign_in(&email, &password).await.map_err(|e| {
        warn!(email = %email, error = %e, "Sign-in failed");
        AccountError::from(e)
    })?;

    let profile = deps
        .store
        .get_user(&identity.email)
        .await
        .map_err(|e| {
            error!(email = %identity.email, error = %e, "Failed to load profile");
            AccountError::Store(e)
        })?
        .ok_or(AccountError::ProfileNotFound)?;

    let role = profile.role().ok_or_else(|| {
        warn!(email = %profile.email, "Profile has no role");
        AccountError::RoleMissing
    })?;
    let next_view = profile.next_view().ok_or(AccountError::RoleMissing)?;
    debug!(email = %profile.email, role = %role, ?next_view, "Login resolved");

    let token = deps.jwt_service.create_token(&profile.email, role)?;

    deps.notifier.success("Signed in");

    Ok(Session {
        token,
        profile,
        next_view,
    })
}
