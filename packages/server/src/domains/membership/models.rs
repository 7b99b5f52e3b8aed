use juniper::GraphQLEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::Full;

/// Which collection a toggle targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, GraphQLEnum)]
#[serde(rename_all = "snake_case")]
pub enum MembershipKind {
    /// Register / unregister as an attendee
    Event,
    /// Apply / withdraw an application
    Job,
    /// Join / leave a study group
    Group,
}

impl MembershipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipKind::Event => "event",
            MembershipKind::Job => "job",
            MembershipKind::Group => "group",
        }
    }

    /// Message shown to the user after a toggle went through
    pub fn success_notice(&self, change: MembershipChange) -> &'static str {
        match (self, change.is_member()) {
            (MembershipKind::Event, true) => "You are registered for the event",
            (MembershipKind::Event, false) => "Your registration was cancelled",
            (MembershipKind::Job, true) => "Application sent",
            (MembershipKind::Job, false) => "Application withdrawn",
            (MembershipKind::Group, true) => "You joined the group",
            (MembershipKind::Group, false) => "You left the group",
        }
    }

    pub fn failure_notice(&self) -> &'static str {
        match self {
            MembershipKind::Event => "Could not update your registration",
            MembershipKind::Job => "Could not update your application",
            MembershipKind::Group => "Could not update your group membership",
        }
    }
}

impl fmt::Display for MembershipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one toggle for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, GraphQLEnum)]
#[serde(rename_all = "snake_case")]
pub enum MembershipChange {
    Joined,
    Left,
    /// Join requested by a user already in the list
    AlreadyMember,
    /// Leave requested by a user not in the list
    NotMember,
}

impl MembershipChange {
    /// Counter delta applied by this change
    pub fn delta(&self) -> i32 {
        match self {
            MembershipChange::Joined => 1,
            MembershipChange::Left => -1,
            MembershipChange::AlreadyMember | MembershipChange::NotMember => 0,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.delta() == 0
    }

    /// State the user ends up in
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            MembershipChange::Joined | MembershipChange::AlreadyMember
        )
    }
}

/// The counter and id-list pair denormalized onto an event, job or group.
///
/// Invariants kept by [`Membership::toggle`]: every id appears at most once,
/// `count` never goes below zero, and a no-op toggle leaves both fields alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub count: i32,
    pub ids: Vec<String>,
}

impl Membership {
    pub fn new(count: i32, ids: Vec<String>) -> Self {
        Self { count, ids }
    }

    /// Membership seeded with a single member (the creator of a group)
    pub fn seeded(user_id: &str) -> Self {
        Self {
            count: 1,
            ids: vec![user_id.to_string()],
        }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.ids.iter().any(|id| id == user_id)
    }

    /// Apply a join (`want_join = true`) or leave for `user_id`.
    ///
    /// Join is a set-union, leave a set-difference. The counter moves only
    /// when the list actually changes. A join is refused once `count` has
    /// reached `capacity`, or when the counter has no room left at all.
    pub fn toggle(
        &self,
        user_id: &str,
        want_join: bool,
        capacity: Option<i32>,
    ) -> Result<(Membership, MembershipChange), Full> {
        let present = self.contains(user_id);

        match (want_join, present) {
            (true, true) => Ok((self.clone(), MembershipChange::AlreadyMember)),
            (false, false) => Ok((self.clone(), MembershipChange::NotMember)),
            (true, false) => {
                if let Some(capacity) = capacity {
                    if self.count >= capacity {
                        return Err(Full { capacity });
                    }
                }
                let count = self
                    .count
                    .checked_add(1)
                    .ok_or(Full { capacity: self.count })?;
                let mut ids = self.ids.clone();
                ids.push(user_id.to_string());
                Ok((
                    Membership { count, ids },
                    MembershipChange::Joined,
                ))
            }
            (false, true) => {
                let ids: Vec<String> = self
                    .ids
                    .iter()
                    .filter(|id| id.as_str() != user_id)
                    .cloned()
                    .collect();
                Ok((
                    Membership {
                        count: (self.count - 1).max(0),
                        ids,
                    },
                    MembershipChange::Left,
                ))
            }
        }
    }

    /// Whether counter and list agree
    pub fn is_consistent(&self) -> bool {
        usize::try_from(self.count).map_or(false, |count| count == self.ids.len())
    }
}

/// What the store reports back after a membership update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipUpdate {
    pub change: MembershipChange,
    /// Counter and id-list as stored after the update
    pub membership: Membership,
    /// Membership version the snapshot was taken at. Bumped by the store on
    /// every update that changed the list, so a higher version is always the
    /// more recent snapshot.
    pub version: i64,
}

/// Catalog entities that carry a membership.
pub trait Membered {
    const KIND: MembershipKind;

    fn entity_id(&self) -> Uuid;

    fn membership(&self) -> Membership;

    /// Version of the membership snapshot this copy holds
    fn membership_version(&self) -> i64;

    fn set_membership(&mut self, membership: Membership, version: i64);

    /// Upper bound on members, `None` when uncapped
    fn capacity(&self) -> Option<i32>;
}
