//! Event participant.

use super::ids::assign_once;
use super::{EventId, ModelError, ParticipantId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A person taking part in events under a given task/role.
///
/// The event set is the read side of the participant/event association: it
/// is loaded from storage and only grows through `Event::enroll` + save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    id: Option<ParticipantId>,
    /// Last name.
    pub nom: String,
    /// First name.
    pub prenom: String,
    /// Free-text task/role, e.g. `ORGANISATEUR`.
    pub tache: String,
    events: BTreeSet<EventId>,
}

impl Participant {
    pub fn new(
        nom: impl Into<String>,
        prenom: impl Into<String>,
        tache: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            nom: nom.into(),
            prenom: prenom.into(),
            tache: tache.into(),
            events: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> Option<ParticipantId> {
        self.id
    }

    /// Records the identity given by persistence.
    pub fn assign_id(&mut self, id: ParticipantId) -> Result<(), ModelError> {
        assign_once(&mut self.id, id, "participant")
    }

    /// Events this participant is enrolled in, as last loaded.
    pub fn event_ids(&self) -> &BTreeSet<EventId> {
        &self.events
    }

    /// Exact, case-sensitive match on all three identifying attributes.
    pub fn matches(&self, nom: &str, prenom: &str, tache: &str) -> bool {
        self.nom == nom && self.prenom == prenom && self.tache == tache
    }

    pub(crate) fn record_event(&mut self, event_id: EventId) -> bool {
        self.events.insert(event_id)
    }
}
