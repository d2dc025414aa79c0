//! Typed identifiers for persisted entities.
//!
//! Identifiers are assigned by the persistence layer (SQLite rowids) and
//! wrapped in newtypes so an event id can never be passed where a
//! participant id is expected.

use crate::model::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Identity of a persisted [`Event`](crate::model::event::Event).
    EventId
);
entity_id!(
    /// Identity of a persisted [`Participant`](crate::model::participant::Participant).
    ParticipantId
);
entity_id!(
    /// Identity of a persisted [`Logistics`](crate::model::logistics::Logistics) item.
    LogisticsId
);

/// Assigns `id` into an identity slot that may only be written once.
///
/// Re-assigning the same value is a no-op; a different value is rejected.
pub(crate) fn assign_once<T>(
    slot: &mut Option<T>,
    id: T,
    entity: &'static str,
) -> Result<(), ModelError>
where
    T: Copy + PartialEq + Display,
{
    match *slot {
        None => {
            *slot = Some(id);
            Ok(())
        }
        Some(current) if current == id => Ok(()),
        Some(current) => Err(ModelError::IdentityReassigned {
            entity,
            current: current.to_string(),
            requested: id.to_string(),
        }),
    }
}
