//! Domain model for events, participants and logistics.
//!
//! # Responsibility
//! - Define the entities shared by repositories and services.
//! - Own the invariants that do not need storage to be checked.
//!
//! # Invariants
//! - Identities are assigned once by persistence and never change.
//! - Participant membership of an event is only changed via `Event::enroll`.
//! - An event's cost is recomputed from its reserved logistics only.

mod error;
pub mod event;
pub mod ids;
pub mod logistics;
pub mod participant;

pub use error::ModelError;
pub use ids::{EventId, LogisticsId, ParticipantId};
