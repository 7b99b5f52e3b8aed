// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (toggle rules, validation) lives in the domains and calls these.
//
// Naming convention: Base* for trait names (e.g., BaseDocumentStore, BaseNotifier)

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::common::Email;
use crate::domains::auth::models::{OnboardingProfile, UserProfile};
use crate::domains::events::models::{Event, NewEvent};
use crate::domains::groups::models::{Group, NewGroup};
use crate::domains::jobs::models::{Job, NewJob};
use crate::domains::membership::{MembershipError, MembershipKind, MembershipUpdate};
use crate::domains::resources::models::Resource;

// =============================================================================
// Document Store Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseDocumentStore: Send + Sync {
    /// Cheap round trip used by the health endpoint
    async fn ping(&self) -> Result<()>;

    /// All events, newest first
    async fn list_events(&self) -> Result<Vec<Event>>;

    /// All jobs, newest first
    async fn list_jobs(&self) -> Result<Vec<Job>>;

    /// All groups, newest first
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// All resources, newest first
    async fn list_resources(&self) -> Result<Vec<Resource>>;

    /// Create an event with a generated id and zero attendees
    async fn create_event(&self, event: NewEvent) -> Result<Event>;

    /// Create a job with a generated id and zero applicants
    async fn create_job(&self, job: NewJob) -> Result<Job>;

    /// Create a group with a generated id; the creator is its first member
    async fn create_group(&self, group: NewGroup) -> Result<Group>;

    /// Insert or replace the profile keyed by its email
    async fn put_user(&self, profile: &UserProfile) -> Result<()>;

    async fn get_user(&self, email: &Email) -> Result<Option<UserProfile>>;

    /// Merge onboarding answers into an existing profile and mark it complete.
    /// Returns `None` when no profile exists for `email`.
    async fn save_onboarding(
        &self,
        email: &Email,
        onboarding: &OnboardingProfile,
    ) -> Result<Option<UserProfile>>;

    /// Apply one join/leave to a single record as one write.
    ///
    /// Implementations must use set semantics on the id-list, move the counter
    /// only when the list changes, and refuse joins past capacity.
    async fn update_membership(
        &self,
        kind: MembershipKind,
        entity_id: Uuid,
        user_id: &Email,
        want_join: bool,
    ) -> Result<MembershipUpdate, MembershipError>;
}

// =============================================================================
// Auth Provider Trait (Infrastructure - hosted email/password identity)
// =============================================================================

/// Identity confirmed by the auth provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub email: Email,
    /// Provider-side user id
    pub provider_uid: String,
}

#[derive(Error, Debug)]
pub enum AuthProviderError {
    #[error("Email already in use")]
    EmailExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password rejected by provider: {0}")]
    WeakPassword(String),

    #[error("Auth provider error: {0}")]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait BaseAuthProvider: Send + Sync {
    async fn sign_up(&self, email: &Email, password: &str)
        -> Result<AuthIdentity, AuthProviderError>;

    async fn sign_in(&self, email: &Email, password: &str)
        -> Result<AuthIdentity, AuthProviderError>;
}

// =============================================================================
// Notification Trait (Infrastructure - user-facing success/error messages)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Fire-and-forget messages shown to the user after an operation
pub trait BaseNotifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}
