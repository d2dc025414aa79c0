//! Event cost aggregation.
//!
//! # Responsibility
//! - Recompute the cost of every event a given participant takes part in.
//!
//! # Invariants
//! - Each event's cost is recomputed from scratch from its own reserved
//!   logistics; totals never leak from one event into another.
//! - Exactly one save per matching event, none when nothing matches.
//! - Repository failures propagate unchanged; no retry.

use crate::repo::event_repo::EventRepository;
use crate::repo::RepoResult;
use log::info;

/// Recomputes and persists event costs.
pub struct CostAggregationService<R: EventRepository> {
    events: R,
}

impl<R: EventRepository> CostAggregationService<R> {
    pub fn new(events: R) -> Self {
        Self { events }
    }

    /// Recomputes the cost of every event having a participant with exactly
    /// this `nom`, `prenom` and `tache`, and saves each event.
    ///
    /// Events saved before a failing save stay saved. Persisted events always
    /// have a finite reserved total, so the recomputed cost passes validation
    /// at save time.
    pub fn recompute_costs(&self, nom: &str, prenom: &str, tache: &str) -> RepoResult<()> {
        let events = self
            .events
            .find_events_by_participant_attributes(nom, prenom, tache)?;
        info!(
            "event=cost_recompute module=service status=start matched={}",
            events.len()
        );

        for mut event in events {
            let total = event.recompute_cost();
            let saved = self.events.save(&event)?;
            info!(
                "event=cost_recompute module=service status=ok event_id={} cost={total}",
                saved
                    .id()
                    .map_or_else(|| "unknown".to_string(), |id| id.to_string())
            );
        }

        Ok(())
    }
}
