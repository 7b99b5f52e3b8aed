// MindSync - API Core
//
// Backend for matching students with universities and companies: events,
// jobs and study groups, with learning-style onboarding.
// Data lives in a document store; identity is delegated to a hosted provider.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
