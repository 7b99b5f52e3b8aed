use thiserror::Error;
use uuid::Uuid;

use super::models::MembershipKind;

/// Why a toggle did not go through
#[derive(Error, Debug)]
pub enum MembershipError {
    #[error("{kind} {entity_id} not found")]
    NotFound { kind: MembershipKind, entity_id: Uuid },

    #[error("{kind} {entity_id} is full ({capacity} places)")]
    CapacityReached {
        kind: MembershipKind,
        entity_id: Uuid,
        capacity: i32,
    },

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// A join was refused because every place is taken
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no places left (capacity {capacity})")]
pub struct Full {
    pub capacity: i32,
}

impl Full {
    pub fn into_error(self, kind: MembershipKind, entity_id: Uuid) -> MembershipError {
        MembershipError::CapacityReached {
            kind,
            entity_id,
            capacity: self.capacity,
        }
    }
}
