use std::sync::Arc;

use juniper::{FieldError, FieldResult};

use crate::domains::catalog::Catalog;
use crate::kernel::ServerDeps;
use crate::server::middleware::AuthUser;

/// GraphQL request context
///
/// Shared services plus the caller's identity, if the request carried a valid token.
#[derive(Clone)]
pub struct GraphQLContext {
    pub server_deps: Arc<ServerDeps>,
    pub catalog: Arc<Catalog>,
    pub auth_user: Option<AuthUser>,
}

impl juniper::Context for GraphQLContext {}

impl GraphQLContext {
    pub fn new(
        server_deps: Arc<ServerDeps>,
        catalog: Arc<Catalog>,
        auth_user: Option<AuthUser>,
    ) -> Self {
        Self {
            server_deps,
            catalog,
            auth_user,
        }
    }

    pub fn deps(&self) -> &ServerDeps {
        &self.server_deps
    }

    pub fn require_auth(&self) -> FieldResult<&AuthUser> {
        self.auth_user
            .as_ref()
            .ok_or_else(|| FieldError::new("Authentication required", juniper::Value::null()))
    }
}
