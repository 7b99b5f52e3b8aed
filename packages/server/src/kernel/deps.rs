//! Server dependencies for actions (using traits for testability)
//!
//! This module provides the central dependency container used by the account
//! actions, the catalog and the GraphQL layer. All external services use trait
//! abstractions to enable testing.

use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::{BaseAuthProvider, BaseDocumentStore, BaseNotifier};

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    /// Remote document store holding users, events, jobs, groups and resources
    pub store: Arc<dyn BaseDocumentStore>,
    /// Hosted email/password identity provider
    pub auth: Arc<dyn BaseAuthProvider>,
    /// User-facing success/error messages
    pub notifier: Arc<dyn BaseNotifier>,
    /// JWT service for token creation
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseDocumentStore>,
        auth: Arc<dyn BaseAuthProvider>,
        notifier: Arc<dyn BaseNotifier>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            store,
            auth,
            notifier,
            jwt_service,
        }
    }
}
