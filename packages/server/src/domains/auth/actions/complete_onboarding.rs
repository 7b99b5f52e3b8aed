//! Complete onboarding action

use tracing::{error, info};

use crate::common::Email;
use crate::domains::auth::models::{CompleteOnboardingInput, UserProfile};
use crate::domains::auth::AccountError;
use crate::kernel::ServerDeps;

/// Score the quiz, store the answers on the profile and mark onboarding done
pub async fn complete_onboarding(
    email: &Email,
    input: CompleteOnboardingInput,
    deps: &ServerDeps,
) -> Result<UserProfile, AccountError> {
    let onboarding = input.validate()?;
    let style = onboarding.learning_style;

    let profile = match deps.store.save_onboarding(email, &onboarding).await {
        Ok(Some(profile)) => profile,
        Ok(None) => return Err(AccountError::ProfileNotFound),
        Err(e) => {
            error!(email = %email, error = %e, "Failed to save onboarding");
            deps.notifier.error("Could not save your profile");
            return Err(AccountError::Store(e));
        }
    };

    info!(email = %email, learning_style = %style, "Onboarding completed");
    deps.notifier.success("Profile saved");

    Ok(profile)
}
