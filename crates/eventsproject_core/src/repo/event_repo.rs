//! Event repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the event aggregate: event row, participant links and owned
//!   logistics, in one transaction per save.
//! - Provide the lookups the services need (by id, description, start-date
//!   range and participant attributes).
//!
//! # Invariants
//! - A save writes the whole aggregate: participant links are replaced and
//!   every attached logistics item is inserted or updated.
//! - A save never takes over a logistics row owned by another event; such a
//!   row is reported as `LogisticsNotFound`.
//! - Participant attribute matching is exact and case-sensitive.
//! - Multi-row results are ordered by event id.

use super::{ensure_schema_ready, RepoError, RepoResult, TableContract};
use crate::model::event::Event;
use crate::model::logistics::Logistics;
use crate::model::{EventId, LogisticsId, ParticipantId};
use chrono::NaiveDate;
use log::debug;
use rusqlite::{params, Connection, Row, ToSql};
use std::collections::BTreeSet;

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    description,
    date_debut,
    date_fin,
    cout
FROM events";

const REQUIRED_TABLES: &[TableContract] = &[
    (
        "events",
        &["id", "description", "date_debut", "date_fin", "cout", "updated_at"],
    ),
    ("event_participants", &["event_id", "participant_id"]),
    (
        "logistics",
        &["id", "event_id", "description", "reserve", "prix_unit", "quantite"],
    ),
];

/// Repository interface for the event aggregate.
pub trait EventRepository {
    /// Inserts (no id) or updates (with id) the aggregate and returns it
    /// with every identity assigned.
    fn save(&self, event: &Event) -> RepoResult<Event>;
    fn find_by_id(&self, id: EventId) -> RepoResult<Option<Event>>;
    /// Exact description match; the oldest event wins on duplicates.
    fn find_by_description(&self, description: &str) -> RepoResult<Option<Event>>;
    /// Events whose `date_debut` lies in `start..=end`.
    fn find_by_date_debut_between(&self, start: NaiveDate, end: NaiveDate)
        -> RepoResult<Vec<Event>>;
    /// Events with at least one participant matching all three attributes.
    fn find_events_by_participant_attributes(
        &self,
        nom: &str,
        prenom: &str,
        tache: &str,
    ) -> RepoResult<Vec<Event>>;
}

impl<R: EventRepository + ?Sized> EventRepository for &R {
    fn save(&self, event: &Event) -> RepoResult<Event> {
        (**self).save(event)
    }

    fn find_by_id(&self, id: EventId) -> RepoResult<Option<Event>> {
        (**self).find_by_id(id)
    }

    fn find_by_description(&self, description: &str) -> RepoResult<Option<Event>> {
        (**self).find_by_description(description)
    }

    fn find_by_date_debut_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Event>> {
        (**self).find_by_date_debut_between(start, end)
    }

    fn find_events_by_participant_attributes(
        &self,
        nom: &str,
        prenom: &str,
        tache: &str,
    ) -> RepoResult<Vec<Event>> {
        (**self).find_events_by_participant_attributes(nom, prenom, tache)
    }
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }

    fn query_events(&self, sql: &str, params: &[&dyn ToSql]) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        for event in &mut events {
            hydrate_event(self.conn, event)?;
        }
        Ok(events)
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn save(&self, event: &Event) -> RepoResult<Event> {
        event.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let mut saved = event.clone();
        let event_id = match event.id() {
            Some(id) => {
                let changed = tx.execute(
                    "UPDATE events
                     SET
                        description = ?1,
                        date_debut = ?2,
                        date_fin = ?3,
                        cout = ?4,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?5;",
                    params![
                        event.description.as_str(),
                        event.date_debut,
                        event.date_fin,
                        event.cout(),
                        id.0,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::EventNotFound(id));
                }
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO events (description, date_debut, date_fin, cout)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        event.description.as_str(),
                        event.date_debut,
                        event.date_fin,
                        event.cout(),
                    ],
                )?;
                let id = EventId(tx.last_insert_rowid());
                saved.assign_id(id)?;
                id
            }
        };

        replace_participant_links(&tx, event_id, saved.participant_ids())?;
        sync_logistics(&tx, event_id, saved.logistics_mut())?;
        tx.commit()?;

        debug!(
            "event=event_save module=repo status=ok event_id={event_id} participants={} logistics={}",
            saved.participant_ids().len(),
            saved.logistics().len()
        );
        Ok(saved)
    }

    fn find_by_id(&self, id: EventId) -> RepoResult<Option<Event>> {
        let sql = format!("{EVENT_SELECT_SQL} WHERE id = ?1;");
        Ok(self.query_events(&sql, &[&id.0])?.into_iter().next())
    }

    fn find_by_description(&self, description: &str) -> RepoResult<Option<Event>> {
        let sql = format!("{EVENT_SELECT_SQL} WHERE description = ?1 ORDER BY id ASC LIMIT 1;");
        Ok(self.query_events(&sql, &[&description])?.into_iter().next())
    }

    fn find_by_date_debut_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Event>> {
        let sql = format!(
            "{EVENT_SELECT_SQL}
             WHERE date_debut IS NOT NULL
               AND date_debut BETWEEN ?1 AND ?2
             ORDER BY id ASC;"
        );
        self.query_events(&sql, &[&start, &end])
    }

    fn find_events_by_participant_attributes(
        &self,
        nom: &str,
        prenom: &str,
        tache: &str,
    ) -> RepoResult<Vec<Event>> {
        let sql = format!(
            "{EVENT_SELECT_SQL}
             WHERE EXISTS (
                SELECT 1
                FROM event_participants ep
                INNER JOIN participants p ON p.id = ep.participant_id
                WHERE ep.event_id = events.id
                  AND p.nom = ?1
                  AND p.prenom = ?2
                  AND p.tache = ?3
             )
             ORDER BY id ASC;"
        );
        self.query_events(&sql, &[&nom, &prenom, &tache])
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let mut event = Event::new(row.get::<_, String>("description")?);
    event.date_debut = row.get("date_debut")?;
    event.date_fin = row.get("date_fin")?;
    event.set_cout(row.get("cout")?);
    event.assign_id(EventId(row.get("id")?))?;
    Ok(event)
}

fn hydrate_event(conn: &Connection, event: &mut Event) -> RepoResult<()> {
    let event_id = event
        .id()
        .ok_or_else(|| RepoError::InvalidData("event row without id".to_string()))?;

    let mut stmt = conn.prepare(
        "SELECT participant_id
         FROM event_participants
         WHERE event_id = ?1
         ORDER BY participant_id ASC;",
    )?;
    let mut rows = stmt.query([event_id.0])?;
    while let Some(row) = rows.next()? {
        event.restore_participant(ParticipantId(row.get(0)?));
    }

    let mut stmt = conn.prepare(
        "SELECT id, description, reserve, prix_unit, quantite
         FROM logistics
         WHERE event_id = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([event_id.0])?;
    while let Some(row) = rows.next()? {
        event.add_logistics(parse_logistics_row(row)?)?;
    }

    event.validate()?;
    Ok(())
}

fn parse_logistics_row(row: &Row<'_>) -> RepoResult<Logistics> {
    let reserve = match row.get::<_, i64>("reserve")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid reserve value `{other}` in logistics.reserve"
            )));
        }
    };

    let mut item = Logistics::priced(
        row.get::<_, String>("description")?,
        reserve,
        row.get("prix_unit")?,
        row.get("quantite")?,
    );
    item.assign_id(LogisticsId(row.get("id")?))?;
    Ok(item)
}

fn replace_participant_links(
    conn: &Connection,
    event_id: EventId,
    participants: &BTreeSet<ParticipantId>,
) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM event_participants WHERE event_id = ?1;",
        [event_id.0],
    )?;

    for participant_id in participants {
        let inserted = conn.execute(
            "INSERT INTO event_participants (event_id, participant_id)
             SELECT ?1, id
             FROM participants
             WHERE id = ?2;",
            params![event_id.0, participant_id.0],
        )?;
        if inserted == 0 {
            return Err(RepoError::ParticipantNotFound(*participant_id));
        }
    }

    Ok(())
}

fn sync_logistics(
    conn: &Connection,
    event_id: EventId,
    items: &mut [Logistics],
) -> RepoResult<()> {
    for item in items.iter_mut() {
        item.attach_to(event_id);
        match item.id() {
            Some(id) => {
                let changed = conn.execute(
                    "UPDATE logistics
                     SET
                        event_id = ?1,
                        description = ?2,
                        reserve = ?3,
                        prix_unit = ?4,
                        quantite = ?5
                     WHERE id = ?6
                       AND (event_id = ?1 OR event_id IS NULL);",
                    params![
                        event_id.0,
                        item.description.as_str(),
                        item.reserve,
                        item.prix_unit,
                        item.quantite,
                        id.0,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::LogisticsNotFound(id));
                }
            }
            None => {
                conn.execute(
                    "INSERT INTO logistics (event_id, description, reserve, prix_unit, quantite)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        event_id.0,
                        item.description.as_str(),
                        item.reserve,
                        item.prix_unit,
                        item.quantite,
                    ],
                )?;
                let id = LogisticsId(conn.last_insert_rowid());
                item.assign_id(id)?;
            }
        }
    }

    Ok(())
}
