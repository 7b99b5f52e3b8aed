pub mod onboarding;
pub mod user;

pub use onboarding::*;
pub use user::*;
