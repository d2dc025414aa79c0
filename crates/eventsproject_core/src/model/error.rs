use super::EventId;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation and association errors raised by the domain model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Event end date precedes its start date.
    ReversedDateRange { start: NaiveDate, end: NaiveDate },
    /// Event cost is NaN or infinite.
    NonFiniteCost(f64),
    /// Logistics unit price is NaN, infinite or negative.
    InvalidUnitPrice(f64),
    /// Identity was already assigned with a different value.
    IdentityReassigned {
        entity: &'static str,
        current: String,
        requested: String,
    },
    /// Association requires a persisted participant.
    TransientParticipant,
    /// Logistics item is already owned by another event.
    ForeignLogistics { owner: EventId },
    /// Reserved logistics total does not fit in a finite `f64`.
    ReservedTotalOverflow,
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReversedDateRange { start, end } => {
                write!(f, "event end date {end} is before start date {start}")
            }
            Self::NonFiniteCost(value) => write!(f, "event cost must be finite, got {value}"),
            Self::InvalidUnitPrice(value) => {
                write!(f, "logistics unit price must be finite and >= 0, got {value}")
            }
            Self::IdentityReassigned {
                entity,
                current,
                requested,
            } => write!(
                f,
                "{entity} identity is immutable: already {current}, refusing {requested}"
            ),
            Self::TransientParticipant => {
                write!(f, "participant must be persisted before enrollment")
            }
            Self::ForeignLogistics { owner } => {
                write!(f, "logistics item already belongs to event {owner}")
            }
            Self::ReservedTotalOverflow => {
                write!(f, "reserved logistics total overflows a finite cost")
            }
        }
    }
}

impl Error for ModelError {}
