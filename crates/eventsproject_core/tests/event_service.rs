use chrono::NaiveDate;
use eventsproject_core::db::open_db_in_memory;
use eventsproject_core::{
    Event, EventRepository, EventService, EventServiceError, Logistics, ModelError, Participant,
    ParticipantId, ParticipantRepository, SqliteEventRepository, SqliteParticipantRepository,
};
use rusqlite::Connection;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn event_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn add_participant_assigns_identity() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let service = EventService::new(&events, &participants);

    let saved = service
        .add_participant(&Participant::new("Tounsi", "Ahmed", "ORGANISATEUR"))
        .unwrap();

    let id = saved.id().expect("identity assigned");
    let loaded = participants.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.nom, "Tounsi");
    assert!(loaded.event_ids().is_empty());
}

#[test]
fn enrolling_participant_links_both_sides() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let service = EventService::new(&events, &participants);
    let ahmed = service
        .add_participant(&Participant::new("Tounsi", "Ahmed", "ORGANISATEUR"))
        .unwrap();
    let ahmed_id = ahmed.id().unwrap();

    let event = Event::scheduled("Test Event", date(2024, 3, 1), date(2024, 3, 2));
    let saved = service
        .add_affect_event_participant(event, ahmed_id)
        .unwrap();

    let event_id = saved.id().expect("event saved");
    assert!(saved.participant_ids().contains(&ahmed_id));
    let reloaded = participants.find_by_id(ahmed_id).unwrap().unwrap();
    assert!(reloaded.event_ids().contains(&event_id));

    // Enrolling again keeps a single link.
    let again = service
        .add_affect_event_participant(saved, ahmed_id)
        .unwrap();
    assert_eq!(again.id(), Some(event_id));
    assert_eq!(again.participant_ids().len(), 1);
    assert_eq!(event_count(&conn), 1);
}

#[test]
fn enrolling_unknown_participant_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let service = EventService::new(&events, &participants);

    let err = service
        .add_affect_event_participant(Event::new("Test Event"), ParticipantId(77))
        .unwrap_err();

    assert!(matches!(
        err,
        EventServiceError::ParticipantNotFound(ParticipantId(77))
    ));
    assert_eq!(event_count(&conn), 0);
}

#[test]
fn add_affect_event_participants_checks_every_listed_participant() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let service = EventService::new(&events, &participants);
    let mut ahmed = service
        .add_participant(&Participant::new("Tounsi", "Ahmed", "ORGANISATEUR"))
        .unwrap();
    let mut sarra = service
        .add_participant(&Participant::new("Ben Ali", "Sarra", "INVITE"))
        .unwrap();

    let mut event = Event::new("Gala");
    event.enroll(&mut ahmed).unwrap();
    event.enroll(&mut sarra).unwrap();
    let saved = service.add_affect_event_participants(event).unwrap();
    assert_eq!(saved.participant_ids().len(), 2);

    let mut ghost = Participant::new("No", "Body", "INVITE");
    ghost.assign_id(ParticipantId(999)).unwrap();
    let mut broken = Event::new("Broken");
    broken.enroll(&mut ahmed).unwrap();
    broken.enroll(&mut ghost).unwrap();

    let err = service.add_affect_event_participants(broken).unwrap_err();
    assert!(matches!(
        err,
        EventServiceError::ParticipantNotFound(ParticipantId(999))
    ));
    assert_eq!(event_count(&conn), 1);
}

#[test]
fn add_affect_log_attaches_to_event_by_description() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let service = EventService::new(&events, &participants);
    let event = events.save(&Event::new("Test Event")).unwrap();

    let item = service
        .add_affect_log(Logistics::priced("Chairs", true, 10.0, 5), "Test Event")
        .unwrap();

    assert!(item.id().is_some());
    assert_eq!(item.event_id(), event.id());
    assert_eq!(item.description, "Chairs");

    let reloaded = events.find_by_id(event.id().unwrap()).unwrap().unwrap();
    assert_eq!(reloaded.logistics(), std::slice::from_ref(&item));
}

#[test]
fn add_affect_log_with_unknown_description_fails() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let service = EventService::new(&events, &participants);

    let err = service
        .add_affect_log(Logistics::priced("Chairs", true, 10.0, 5), "Missing")
        .unwrap_err();

    match err {
        EventServiceError::EventNotFound(description) => assert_eq!(description, "Missing"),
        other => panic!("unexpected error: {other}"),
    }
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM logistics;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn add_affect_log_keeps_logistics_with_their_first_event() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let service = EventService::new(&events, &participants);
    let first = events.save(&Event::new("A")).unwrap();
    let second = events.save(&Event::new("B")).unwrap();

    let attached = service
        .add_affect_log(Logistics::priced("Chairs", true, 10.0, 5), "A")
        .unwrap();
    let err = service.add_affect_log(attached, "B").unwrap_err();

    match err {
        EventServiceError::Model(ModelError::ForeignLogistics { owner }) => {
            assert_eq!(Some(owner), first.id());
        }
        other => panic!("unexpected error: {other}"),
    }
    let first = events.find_by_id(first.id().unwrap()).unwrap().unwrap();
    let second = events.find_by_id(second.id().unwrap()).unwrap().unwrap();
    assert_eq!(first.logistics().len(), 1);
    assert!(second.logistics().is_empty());
}

#[test]
fn logistics_dates_returns_reserved_items_in_range() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let service = EventService::new(&events, &participants);

    events
        .save(&Event::scheduled("Spring", date(2024, 3, 1), date(2024, 3, 1)))
        .unwrap();
    events
        .save(&Event::scheduled("Summer", date(2024, 7, 1), date(2024, 7, 2)))
        .unwrap();
    events
        .save(&Event::scheduled("Empty", date(2024, 3, 10), date(2024, 3, 10)))
        .unwrap();
    service
        .add_affect_log(Logistics::priced("Tents", true, 50.0, 2), "Spring")
        .unwrap();
    service
        .add_affect_log(Logistics::priced("Flyers", false, 0.5, 100), "Spring")
        .unwrap();
    service
        .add_affect_log(Logistics::priced("Fans", true, 15.0, 4), "Summer")
        .unwrap();

    let reserved = service
        .get_logistics_dates(date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();

    let descriptions: Vec<_> = reserved.iter().map(|item| item.description.as_str()).collect();
    assert_eq!(descriptions, vec!["Tents"]);

    let none = service
        .get_logistics_dates(date(2025, 1, 1), date(2025, 12, 31))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn recompute_costs_overwrites_previous_cost_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let service = EventService::new(&events, &participants);
    let ahmed = service
        .add_participant(&Participant::new("Tounsi", "Ahmed", "ORGANISATEUR"))
        .unwrap();

    let mut event = Event::new("Test Event");
    event.set_cout(1000.0);
    let saved = service
        .add_affect_event_participant(event, ahmed.id().unwrap())
        .unwrap();
    let event_id = saved.id().unwrap();
    service
        .add_affect_log(Logistics::priced("Chairs", true, 100.0, 5), "Test Event")
        .unwrap();
    service
        .add_affect_log(Logistics::priced("Stage", false, 2000.0, 1), "Test Event")
        .unwrap();

    let untouched = events.save(&Event::new("Other")).unwrap();

    service
        .recompute_costs("Tounsi", "Ahmed", "ORGANISATEUR")
        .unwrap();
    let first = events.find_by_id(event_id).unwrap().unwrap().cout();
    service
        .recompute_costs("Tounsi", "Ahmed", "ORGANISATEUR")
        .unwrap();
    let second = events.find_by_id(event_id).unwrap().unwrap().cout();

    assert_eq!(first, 500.0);
    assert_eq!(second, 500.0);
    let other = events.find_by_id(untouched.id().unwrap()).unwrap().unwrap();
    assert_eq!(other.cout(), 0.0);
}

#[test]
fn recompute_costs_without_match_leaves_events_alone() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let service = EventService::new(&events, &participants);

    let mut event = Event::new("Priced");
    event.set_cout(42.0);
    let saved = events.save(&event).unwrap();

    service.recompute_costs("Nobody", "Here", "NONE").unwrap();

    let reloaded = events.find_by_id(saved.id().unwrap()).unwrap().unwrap();
    assert_eq!(reloaded.cout(), 42.0);
}
