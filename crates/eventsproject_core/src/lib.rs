//! Core domain logic for the events project.
//!
//! Events, participants and logistics are persisted in SQLite; services
//! depend on repository traits and own the business invariants, including
//! event cost recomputation from reserved logistics.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::Event;
pub use model::logistics::{reserved_cost, Logistics};
pub use model::participant::Participant;
pub use model::{EventId, LogisticsId, ModelError, ParticipantId};
pub use repo::event_repo::{EventRepository, SqliteEventRepository};
pub use repo::participant_repo::{ParticipantRepository, SqliteParticipantRepository};
pub use repo::{RepoError, RepoResult};
pub use service::cost_service::CostAggregationService;
pub use service::event_service::{EventService, EventServiceError};

/// Minimal health-check API for wiring checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
