//! Auth domain actions - business logic functions
//!
//! Actions are async functions called directly from GraphQL mutations.

mod complete_onboarding;
mod login;
mod register;

pub use complete_onboarding::complete_onboarding;
pub use login::login;
pub use register::register;

use super::models::{NextView, UserProfile};

/// Result of a successful login or registration
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub profile: UserProfile,
    pub next_view: NextView,
}
