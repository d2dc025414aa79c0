//! Event use-case service.
//!
//! # Responsibility
//! - Register participants and enroll them in events.
//! - Attach logistics to events and list reserved logistics by date range.
//! - Expose cost recomputation next to the other event use-cases.
//!
//! # Invariants
//! - Enrollment goes through `Event::enroll`; one event save per call.
//! - Missing participants or events are reported before anything is written.

use crate::model::event::Event;
use crate::model::logistics::Logistics;
use crate::model::participant::Participant;
use crate::model::{ModelError, ParticipantId};
use crate::repo::event_repo::EventRepository;
use crate::repo::participant_repo::ParticipantRepository;
use crate::repo::RepoError;
use crate::service::cost_service::CostAggregationService;
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for event use-cases.
#[derive(Debug)]
pub enum EventServiceError {
    /// Referenced participant does not exist.
    ParticipantNotFound(ParticipantId),
    /// No event carries the given description.
    EventNotFound(String),
    /// Domain invariant rejected the change.
    Model(ModelError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but the read-back is not what was written.
    InconsistentState(&'static str),
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParticipantNotFound(id) => write!(f, "participant not found: {id}"),
            Self::EventNotFound(description) => {
                write!(f, "event not found for description `{description}`")
            }
            Self::Model(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent event state: {details}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EventServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ParticipantNotFound(id) => Self::ParticipantNotFound(id),
            RepoError::Validation(err) => Self::Model(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ModelError> for EventServiceError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

/// Event service facade over repository implementations.
pub struct EventService<E: EventRepository, P: ParticipantRepository> {
    events: E,
    participants: P,
}

impl<E: EventRepository, P: ParticipantRepository> EventService<E, P> {
    pub fn new(events: E, participants: P) -> Self {
        Self {
            events,
            participants,
        }
    }

    /// Persists a new participant and returns it with its identity.
    pub fn add_participant(
        &self,
        participant: &Participant,
    ) -> Result<Participant, EventServiceError> {
        let saved = self.participants.save(participant)?;
        info!(
            "event=participant_add module=service status=ok participant_id={}",
            display_id(saved.id())
        );
        Ok(saved)
    }

    /// Enrolls one existing participant in `event` and saves the event.
    pub fn add_affect_event_participant(
        &self,
        mut event: Event,
        participant_id: ParticipantId,
    ) -> Result<Event, EventServiceError> {
        let mut participant = self.require_participant(participant_id)?;
        event.enroll(&mut participant)?;
        let saved = self.events.save(&event)?;
        info!(
            "event=participant_enroll module=service status=ok event_id={} participant_id={participant_id}",
            display_id(saved.id())
        );
        Ok(saved)
    }

    /// Saves `event` after checking every participant it already lists.
    pub fn add_affect_event_participants(&self, event: Event) -> Result<Event, EventServiceError> {
        for participant_id in event.participant_ids() {
            self.require_participant(*participant_id)?;
        }
        let saved = self.events.save(&event)?;
        info!(
            "event=participant_enroll module=service status=ok event_id={} participants={}",
            display_id(saved.id()),
            saved.participant_ids().len()
        );
        Ok(saved)
    }

    /// Attaches `logistics` to the event with exactly `event_description`.
    ///
    /// Returns the persisted item carrying its identity and owning event id.
    /// An item already owned by another event is rejected with
    /// `EventServiceError::Model` before anything is written.
    pub fn add_affect_log(
        &self,
        logistics: Logistics,
        event_description: &str,
    ) -> Result<Logistics, EventServiceError> {
        let mut event = self
            .events
            .find_by_description(event_description)?
            .ok_or_else(|| EventServiceError::EventNotFound(event_description.to_string()))?;

        let position = event.logistics().len();
        if !event.add_logistics(logistics)? {
            warn!(
                "event=logistics_attach module=service status=skipped event_id={} reason=already_attached",
                display_id(event.id())
            );
            return Err(EventServiceError::InconsistentState(
                "logistics item already attached to event",
            ));
        }

        let saved = self.events.save(&event)?;
        let item = saved
            .logistics()
            .get(position)
            .cloned()
            .ok_or(EventServiceError::InconsistentState(
                "attached logistics missing after save",
            ))?;
        info!(
            "event=logistics_attach module=service status=ok event_id={} logistics_id={}",
            display_id(saved.id()),
            display_id(item.id())
        );
        Ok(item)
    }

    /// Reserved logistics of events starting within `start..=end`.
    ///
    /// Events without logistics contribute nothing.
    pub fn get_logistics_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Logistics>, EventServiceError> {
        let events = self.events.find_by_date_debut_between(start, end)?;
        let reserved = events
            .iter()
            .flat_map(|event| event.reserved_logistics())
            .cloned()
            .collect::<Vec<_>>();
        info!(
            "event=logistics_dates module=service status=ok events={} reserved={}",
            events.len(),
            reserved.len()
        );
        Ok(reserved)
    }

    /// Recomputes costs of the events of one participant identity.
    ///
    /// Repository errors are returned as `EventServiceError::Repo` without
    /// any other handling.
    pub fn recompute_costs(
        &self,
        nom: &str,
        prenom: &str,
        tache: &str,
    ) -> Result<(), EventServiceError> {
        CostAggregationService::new(&self.events)
            .recompute_costs(nom, prenom, tache)
            .map_err(EventServiceError::Repo)
    }

    fn require_participant(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Participant, EventServiceError> {
        self.participants
            .find_by_id(participant_id)?
            .ok_or(EventServiceError::ParticipantNotFound(participant_id))
    }
}

fn display_id<T: Display>(id: Option<T>) -> String {
    id.map_or_else(|| "none".to_string(), |value| value.to_string())
}
