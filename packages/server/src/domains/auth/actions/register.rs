//! Register action

use tracing::{error, info};

use super::Session;
use crate::domains::auth::models::{RegisterInput, UserProfile};
use crate::domains::auth::AccountError;
use crate::kernel::ServerDeps;

/// Create the provider account, then the stored profile.
///
/// Students are sent to onboarding next; other roles straight to their dashboard.
pub async fn register(input: RegisterInput, deps: &ServerDeps) -> Result<Session, AccountError> {
    let valid = input.validate()?;

    let identity = deps
        .auth
        .sign_up(&valid.email, &valid.password)
        .await
        .map_err(|e| {
            error!(email = %valid.email, error = %e, "Sign-up failed");
            AccountError::from(e)
        })?;
    info!(email = %identity.email, role = %valid.role, "Auth account created");

    let profile = UserProfile::registered(
        identity.email,
        valid.name,
        valid.role,
        valid.institution_name,
    );
    deps.store.put_user(&profile).await.map_err(|e| {
        error!(email = %profile.email, error = %e, "Failed to store profile");
        AccountError::Store(e)
    })?;

    let token = deps.jwt_service.create_token(&profile.email, valid.role)?;
    let next_view = profile.next_view().ok_or(AccountError::RoleMissing)?;

    deps.notifier.success("Account created");

    Ok(Session {
        token,
        profile,
        next_view,
    })
}
