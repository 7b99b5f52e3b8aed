//! Auth domain - accounts, sessions and onboarding
//!
//! Responsibilities:
//! - Email/password registration and login via the hosted auth provider
//! - User profiles keyed by email, with role detection on login
//! - Learning-style quiz and onboarding completion for students
//! - Session/JWT token management

pub mod actions;
pub mod data;
pub mod errors;
pub mod jwt;
pub mod models;

pub use errors::AccountError;
pub use jwt::{Claims, JwtService};
pub use models::{Creator, NextView, OnboardingProfile, UserProfile, UserRole};
