//! Logistics line items owned by an event.
//!
//! # Invariants
//! - `prix_unit` is finite and non-negative.
//! - `event_id` is the back-reference to the owning event; it is set when the
//!   item is attached to a persisted event and never points elsewhere later.

use super::ids::assign_once;
use super::{EventId, LogisticsId, ModelError};
use serde::{Deserialize, Serialize};

/// One logistics line (equipment, catering, venue...) of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logistics {
    id: Option<LogisticsId>,
    pub description: String,
    /// Only reserved items contribute to the event cost.
    pub reserve: bool,
    pub prix_unit: f64,
    pub quantite: u32,
    event_id: Option<EventId>,
}

impl Logistics {
    /// Creates a transient, non-reserved item with zero price and quantity.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: None,
            description: description.into(),
            reserve: false,
            prix_unit: 0.0,
            quantite: 0,
            event_id: None,
        }
    }

    /// Builder-style shortcut used by callers that know the full line upfront.
    pub fn priced(
        description: impl Into<String>,
        reserve: bool,
        prix_unit: f64,
        quantite: u32,
    ) -> Self {
        Self {
            reserve,
            prix_unit,
            quantite,
            ..Self::new(description)
        }
    }

    pub fn id(&self) -> Option<LogisticsId> {
        self.id
    }

    pub fn event_id(&self) -> Option<EventId> {
        self.event_id
    }

    /// Records the identity given by persistence.
    pub fn assign_id(&mut self, id: LogisticsId) -> Result<(), ModelError> {
        assign_once(&mut self.id, id, "logistics")
    }

    pub(crate) fn attach_to(&mut self, event_id: EventId) {
        self.event_id = Some(event_id);
    }

    /// `prix_unit × quantite`, regardless of the reservation flag.
    pub fn line_total(&self) -> f64 {
        self.prix_unit * f64::from(self.quantite)
    }

    /// Checks price invariants before persistence.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.prix_unit.is_finite() || self.prix_unit < 0.0 {
            return Err(ModelError::InvalidUnitPrice(self.prix_unit));
        }
        Ok(())
    }
}

/// Sums `prix_unit × quantite` over the reserved items only.
///
/// Non-reserved items contribute zero. Plain IEEE addition, so the result
/// does not depend on iteration order beyond floating-point rounding.
pub fn reserved_cost<'a, I>(items: I) -> f64
where
    I: IntoIterator<Item = &'a Logistics>,
{
    items
        .into_iter()
        .filter(|item| item.reserve)
        .map(Logistics::line_total)
        .sum()
}
