//! Membership domain - join/leave, apply/withdraw, register/unregister
//!
//! Events, jobs and groups each carry a denormalized counter next to a list of
//! member ids. Every toggle goes through [`Membership::toggle`], both in the
//! stores and when mirroring a confirmed change into the catalog, so the two
//! sides apply identical rules.

pub mod errors;
pub mod models;

pub use errors::{Full, MembershipError};
pub use models::{Membered, Membership, MembershipChange, MembershipKind, MembershipUpdate};
