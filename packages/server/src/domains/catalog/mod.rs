//! Catalog domain - in-memory copy of every collection, kept in step with the store
//!
//! The server holds one [`Catalog`] behind an `Arc`. It is filled once at
//! startup, extended when something is published and patched after each
//! confirmed membership toggle.

pub mod errors;
pub mod service;

pub use errors::CatalogError;
pub use service::{Catalog, CatalogSummary};
