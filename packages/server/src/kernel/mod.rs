//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod identity_client;
pub mod notifier;
pub mod pg_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use identity_client::IdentityToolkitClient;
pub use notifier::TracingNotifier;
pub use pg_store::PostgresDocumentStore;
pub use test_dependencies::{
    InMemoryDocumentStore, MockAuthProvider, RecordingNotifier, TestDependencies,
};
pub use traits::*;
