use eventsproject_core::{
    reserved_cost, CostAggregationService, Event, EventId, EventRepository, Logistics,
    Participant, ParticipantId, RepoError, RepoResult,
};
use chrono::NaiveDate;
use proptest::prelude::*;
use std::cell::RefCell;

const TASK: &str = "ORGANISATEUR";

/// In-memory event store that records every save.
#[derive(Default)]
struct RecordingEventRepository {
    stored: Vec<(Event, Vec<Participant>)>,
    saves: RefCell<Vec<Event>>,
    fail_on_save: Option<usize>,
}

impl RecordingEventRepository {
    fn with_event(mut self, event: Event, participants: Vec<Participant>) -> Self {
        self.stored.push((event, participants));
        self
    }

    fn saves(&self) -> Vec<Event> {
        self.saves.borrow().clone()
    }
}

impl EventRepository for RecordingEventRepository {
    fn save(&self, event: &Event) -> RepoResult<Event> {
        let index = self.saves.borrow().len();
        if self.fail_on_save == Some(index) {
            return Err(RepoError::InvalidData("storage unavailable".to_string()));
        }
        self.saves.borrow_mut().push(event.clone());
        Ok(event.clone())
    }

    fn find_by_id(&self, id: EventId) -> RepoResult<Option<Event>> {
        Ok(self
            .stored
            .iter()
            .find(|(event, _)| event.id() == Some(id))
            .map(|(event, _)| event.clone()))
    }

    fn find_by_description(&self, _description: &str) -> RepoResult<Option<Event>> {
        Ok(None)
    }

    fn find_by_date_debut_between(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> RepoResult<Vec<Event>> {
        Ok(Vec::new())
    }

    fn find_events_by_participant_attributes(
        &self,
        nom: &str,
        prenom: &str,
        tache: &str,
    ) -> RepoResult<Vec<Event>> {
        Ok(self
            .stored
            .iter()
            .filter(|(_, participants)| {
                participants
                    .iter()
                    .any(|participant| participant.matches(nom, prenom, tache))
            })
            .map(|(event, _)| event.clone())
            .collect())
    }
}

fn participant(id: i64, nom: &str, prenom: &str, tache: &str) -> Participant {
    let mut participant = Participant::new(nom, prenom, tache);
    participant.assign_id(ParticipantId(id)).unwrap();
    participant
}

fn event_with(id: i64, items: Vec<Logistics>, member: &mut Participant) -> Event {
    let mut event = Event::new(format!("event {id}"));
    event.assign_id(EventId(id)).unwrap();
    for item in items {
        event.add_logistics(item).unwrap();
    }
    event.enroll(member).unwrap();
    event
}

fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() <= 1e-9 * left.abs().max(right.abs()).max(1.0)
}

#[test]
fn single_reserved_item_costs_price_times_quantity() {
    let mut ahmed = participant(1, "Tounsi", "Ahmed", TASK);
    let event = event_with(
        1,
        vec![Logistics::priced("sound system", true, 100.0, 5)],
        &mut ahmed,
    );
    let repo = RecordingEventRepository::default().with_event(event, vec![ahmed]);

    CostAggregationService::new(&repo)
        .recompute_costs("Tounsi", "Ahmed", TASK)
        .unwrap();

    let saves = repo.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].cout(), 500.0);
}

#[test]
fn unreserved_items_contribute_nothing() {
    let mut ahmed = participant(1, "Tounsi", "Ahmed", TASK);
    let event = event_with(
        1,
        vec![
            Logistics::priced("chairs", true, 20.0, 3),
            Logistics::priced("stage", false, 1000.0, 1),
        ],
        &mut ahmed,
    );
    let repo = RecordingEventRepository::default().with_event(event, vec![ahmed]);

    CostAggregationService::new(&repo)
        .recompute_costs("Tounsi", "Ahmed", TASK)
        .unwrap();

    assert_eq!(repo.saves()[0].cout(), 60.0);
}

#[test]
fn empty_or_unreserved_logistics_reset_cost_to_zero() {
    let mut ahmed = participant(1, "Tounsi", "Ahmed", TASK);
    let mut empty = event_with(1, Vec::new(), &mut ahmed);
    empty.set_cout(1000.0);
    let mut unreserved = event_with(
        2,
        vec![Logistics::priced("tent", false, 50.0, 4)],
        &mut ahmed,
    );
    unreserved.set_cout(200.0);
    let repo = RecordingEventRepository::default()
        .with_event(empty, vec![ahmed.clone()])
        .with_event(unreserved, vec![ahmed]);

    CostAggregationService::new(&repo)
        .recompute_costs("Tounsi", "Ahmed", TASK)
        .unwrap();

    let costs: Vec<f64> = repo.saves().iter().map(Event::cout).collect();
    assert_eq!(costs, vec![0.0, 0.0]);
}

#[test]
fn no_matching_participant_means_no_save() {
    let mut ahmed = participant(1, "Tounsi", "Ahmed", TASK);
    let event = event_with(
        1,
        vec![Logistics::priced("sound system", true, 100.0, 5)],
        &mut ahmed,
    );
    let repo = RecordingEventRepository::default().with_event(event, vec![ahmed]);
    let service = CostAggregationService::new(&repo);

    service.recompute_costs("tounsi", "Ahmed", TASK).unwrap();
    service.recompute_costs("Tounsi", "Ahmed", "INVITE").unwrap();
    service.recompute_costs("", "", "").unwrap();

    assert!(repo.saves().is_empty());
}

#[test]
fn each_matching_event_is_saved_once_with_its_own_total() {
    let mut ahmed = participant(1, "Tounsi", "Ahmed", TASK);
    let mut other = participant(2, "Ben Salah", "Sami", "INVITE");
    let first = event_with(
        1,
        vec![Logistics::priced("catering", true, 10.0, 10)],
        &mut ahmed,
    );
    let second = event_with(
        2,
        vec![
            Logistics::priced("badges", true, 2.5, 4),
            Logistics::priced("banner", false, 300.0, 1),
        ],
        &mut ahmed,
    );
    let unrelated = event_with(
        3,
        vec![Logistics::priced("bus", true, 900.0, 1)],
        &mut other,
    );
    let repo = RecordingEventRepository::default()
        .with_event(first, vec![ahmed.clone()])
        .with_event(second, vec![ahmed.clone(), other.clone()])
        .with_event(unrelated, vec![other]);

    CostAggregationService::new(&repo)
        .recompute_costs("Tounsi", "Ahmed", TASK)
        .unwrap();

    let saves = repo.saves();
    assert_eq!(saves.len(), 2);
    assert_eq!(saves[0].id(), Some(EventId(1)));
    assert_eq!(saves[0].cout(), 100.0);
    assert_eq!(saves[1].id(), Some(EventId(2)));
    assert_eq!(saves[1].cout(), 10.0);
}

#[test]
fn save_failure_propagates_and_keeps_earlier_saves() {
    let mut ahmed = participant(1, "Tounsi", "Ahmed", TASK);
    let first = event_with(1, vec![Logistics::priced("a", true, 1.0, 1)], &mut ahmed);
    let second = event_with(2, vec![Logistics::priced("b", true, 2.0, 1)], &mut ahmed);
    let third = event_with(3, vec![Logistics::priced("c", true, 3.0, 1)], &mut ahmed);
    let repo = RecordingEventRepository {
        fail_on_save: Some(1),
        ..RecordingEventRepository::default()
    }
    .with_event(first, vec![ahmed.clone()])
    .with_event(second, vec![ahmed.clone()])
    .with_event(third, vec![ahmed]);

    let err = CostAggregationService::new(&repo)
        .recompute_costs("Tounsi", "Ahmed", TASK)
        .unwrap_err();

    assert!(matches!(err, RepoError::InvalidData(_)));
    let saves = repo.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].id(), Some(EventId(1)));
}

#[test]
fn multi_item_sums_tolerate_rounding() {
    let items = vec![
        Logistics::priced("a", true, 0.1, 3),
        Logistics::priced("b", true, 0.2, 7),
        Logistics::priced("c", true, 19.99, 2),
    ];
    assert!(approx_eq(reserved_cost(&items), 0.3 + 1.4 + 39.98));
}

fn logistics_strategy() -> impl Strategy<Value = Logistics> {
    (any::<bool>(), 0.0f64..10_000.0, 0u32..1_000).prop_map(|(reserve, prix_unit, quantite)| {
        Logistics::priced("item", reserve, prix_unit, quantite)
    })
}

proptest! {
    #[test]
    fn reserved_cost_does_not_depend_on_order(
        items in prop::collection::vec(logistics_strategy(), 0..32),
        rotation in 0usize..32,
    ) {
        let expected: f64 = items
            .iter()
            .filter(|item| item.reserve)
            .map(|item| item.prix_unit * f64::from(item.quantite))
            .sum();

        let mut reordered = items.clone();
        reordered.reverse();
        if !reordered.is_empty() {
            let len = reordered.len();
            reordered.rotate_left(rotation % len);
        }

        prop_assert!(approx_eq(reserved_cost(&items), expected));
        prop_assert!(approx_eq(reserved_cost(&reordered), expected));
    }

    #[test]
    fn recomputed_event_cost_matches_reserved_total(
        items in prop::collection::vec(logistics_strategy(), 0..16),
        prior in 0.0f64..1_000_000.0,
    ) {
        let mut event = Event::new("generated");
        event.set_cout(prior);
        for item in items.iter().cloned() {
            event.add_logistics(item).unwrap();
        }

        let total = event.recompute_cost();
        prop_assert!(approx_eq(total, reserved_cost(&items)));
        prop_assert_eq!(event.cout(), total);
    }
}
