//! Event aggregate.
//!
//! # Responsibility
//! - Hold event data together with its participant links and logistics.
//! - Provide the single association entry point (`enroll`).
//! - Recompute the event cost from reserved logistics.
//!
//! # Invariants
//! - `date_fin` must not be earlier than `date_debut` when both are set.
//! - `cout` is finite; after `recompute_cost` it equals the reserved total.
//! - Logistics are unique by identity; transient items are always distinct.
//! - A logistics item is never moved from one event to another.
//! - The reserved logistics total is finite, so `recompute_cost` always
//!   yields a storable cost.
//! - Associations are built with `enroll` and `add_logistics` only;
//!   deserialized events carry neither.

use super::ids::assign_once;
use super::logistics::{reserved_cost, Logistics};
use super::participant::Participant;
use super::{EventId, ModelError, ParticipantId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: Option<EventId>,
    pub description: String,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    cout: f64,
    #[serde(skip_deserializing)]
    participants: BTreeSet<ParticipantId>,
    #[serde(skip_deserializing)]
    logistics: Vec<Logistics>,
}

impl Event {
    /// Creates a transient event with no dates, zero cost and no links.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: None,
            description: description.into(),
            date_debut: None,
            date_fin: None,
            cout: 0.0,
            participants: BTreeSet::new(),
            logistics: Vec::new(),
        }
    }

    /// Creates a transient event spanning `date_debut..=date_fin`.
    pub fn scheduled(
        description: impl Into<String>,
        date_debut: NaiveDate,
        date_fin: NaiveDate,
    ) -> Self {
        Self {
            date_debut: Some(date_debut),
            date_fin: Some(date_fin),
            ..Self::new(description)
        }
    }

    pub fn id(&self) -> Option<EventId> {
        self.id
    }

    /// Records the identity given by persistence.
    ///
    /// Owned logistics get their back-reference updated at the same time.
    pub fn assign_id(&mut self, id: EventId) -> Result<(), ModelError> {
        assign_once(&mut self.id, id, "event")?;
        for item in &mut self.logistics {
            item.attach_to(id);
        }
        Ok(())
    }

    pub fn cout(&self) -> f64 {
        self.cout
    }

    /// Overrides the stored cost. `recompute_cost` is the normal path.
    pub fn set_cout(&mut self, cout: f64) {
        self.cout = cout;
    }

    pub fn participant_ids(&self) -> &BTreeSet<ParticipantId> {
        &self.participants
    }

    pub fn logistics(&self) -> &[Logistics] {
        &self.logistics
    }

    pub(crate) fn logistics_mut(&mut self) -> &mut [Logistics] {
        &mut self.logistics
    }

    /// Reserved logistics only, in attachment order.
    pub fn reserved_logistics(&self) -> impl Iterator<Item = &Logistics> {
        self.logistics.iter().filter(|item| item.reserve)
    }

    /// Associates `participant` with this event on both sides.
    ///
    /// The participant must already be persisted. When this event is still
    /// transient, the participant side is completed once the event is saved
    /// and the association is read back.
    ///
    /// Returns `false` when the participant was already enrolled.
    pub fn enroll(&mut self, participant: &mut Participant) -> Result<bool, ModelError> {
        let participant_id = participant.id().ok_or(ModelError::TransientParticipant)?;
        let inserted = self.participants.insert(participant_id);
        if let Some(event_id) = self.id {
            participant.record_event(event_id);
        }
        Ok(inserted)
    }

    pub(crate) fn restore_participant(&mut self, participant_id: ParticipantId) {
        self.participants.insert(participant_id);
    }

    /// Attaches a logistics item to this event.
    ///
    /// Returns `false` (and drops the item) when an item with the same
    /// identity is already attached.
    ///
    /// # Errors
    /// - `ForeignLogistics` when the item is owned by another event.
    pub fn add_logistics(&mut self, mut item: Logistics) -> Result<bool, ModelError> {
        if let Some(owner) = item.event_id() {
            if self.id != Some(owner) {
                return Err(ModelError::ForeignLogistics { owner });
            }
        }
        if let Some(item_id) = item.id() {
            if self
                .logistics
                .iter()
                .any(|existing| existing.id() == Some(item_id))
            {
                return Ok(false);
            }
        }
        if let Some(event_id) = self.id {
            item.attach_to(event_id);
        }
        self.logistics.push(item);
        Ok(true)
    }

    /// Overwrites `cout` with the reserved logistics total and returns it.
    pub fn recompute_cost(&mut self) -> f64 {
        self.cout = reserved_cost(&self.logistics);
        self.cout
    }

    /// Checks date and cost invariants, then every owned logistics item.
    pub fn validate(&self) -> Result<(), ModelError> {
        if let (Some(start), Some(end)) = (self.date_debut, self.date_fin) {
            if end < start {
                return Err(ModelError::ReversedDateRange { start, end });
            }
        }
        if !self.cout.is_finite() {
            return Err(ModelError::NonFiniteCost(self.cout));
        }
        self.logistics.iter().try_for_each(Logistics::validate)?;
        if !reserved_cost(&self.logistics).is_finite() {
            return Err(ModelError::ReservedTotalOverflow);
        }
        Ok(())
    }
}
