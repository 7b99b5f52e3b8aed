//! Typed ID definitions for catalog entities.
//!
//! ```rust
//! use mindsync_core::common::{EventId, GroupId};
//!
//! let event_id = EventId::new();
//! let group_id = GroupId::new();
//! // let wrong: GroupId = event_id; // compile error
//! # let _ = (event_id, group_id);
//! ```
//!
//! Users are keyed by email rather than a generated id; see [`crate::common::Email`].

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Event entities (talks, workshops, fairs).
pub struct Event;

/// Marker type for Job entities (job and internship postings).
pub struct Job;

/// Marker type for Group entities (student study groups).
pub struct Group;

/// Marker type for Resource entities (learning material).
pub struct Resource;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type EventId = Id<Event>;

pub type JobId = Id<Job>;

pub type GroupId = Id<Group>;

pub type ResourceId = Id<Resource>;
