//! Participant repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A participant's event set is read from `event_participants`, the same
//!   rows written by event saves, so both sides of the association agree.

use super::{ensure_schema_ready, RepoError, RepoResult, TableContract};
use crate::model::participant::Participant;
use crate::model::{EventId, ParticipantId};
use rusqlite::{params, Connection};

const REQUIRED_TABLES: &[TableContract] = &[
    ("participants", &["id", "nom", "prenom", "tache"]),
    ("event_participants", &["event_id", "participant_id"]),
];

/// Repository interface for participants.
pub trait ParticipantRepository {
    /// Inserts (no id) or updates (with id) the participant's own columns.
    ///
    /// Event membership is owned by event saves and is not written here.
    fn save(&self, participant: &Participant) -> RepoResult<Participant>;
    fn find_by_id(&self, id: ParticipantId) -> RepoResult<Option<Participant>>;
}

impl<R: ParticipantRepository + ?Sized> ParticipantRepository for &R {
    fn save(&self, participant: &Participant) -> RepoResult<Participant> {
        (**self).save(participant)
    }

    fn find_by_id(&self, id: ParticipantId) -> RepoResult<Option<Participant>> {
        (**self).find_by_id(id)
    }
}

/// SQLite-backed participant repository.
pub struct SqliteParticipantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParticipantRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl ParticipantRepository for SqliteParticipantRepository<'_> {
    fn save(&self, participant: &Participant) -> RepoResult<Participant> {
        let mut saved = participant.clone();
        match participant.id() {
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE participants
                     SET nom = ?1, prenom = ?2, tache = ?3
                     WHERE id = ?4;",
                    params![
                        participant.nom.as_str(),
                        participant.prenom.as_str(),
                        participant.tache.as_str(),
                        id.0,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::ParticipantNotFound(id));
                }
            }
            None => {
                self.conn.execute(
                    "INSERT INTO participants (nom, prenom, tache) VALUES (?1, ?2, ?3);",
                    params![
                        participant.nom.as_str(),
                        participant.prenom.as_str(),
                        participant.tache.as_str(),
                    ],
                )?;
                saved.assign_id(ParticipantId(self.conn.last_insert_rowid()))?;
            }
        }
        Ok(saved)
    }

    fn find_by_id(&self, id: ParticipantId) -> RepoResult<Option<Participant>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, nom, prenom, tache
             FROM participants
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.0])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let mut participant = Participant::new(
            row.get::<_, String>("nom")?,
            row.get::<_, String>("prenom")?,
            row.get::<_, String>("tache")?,
        );
        participant.assign_id(ParticipantId(row.get("id")?))?;

        let mut stmt = self.conn.prepare(
            "SELECT event_id
             FROM event_participants
             WHERE participant_id = ?1
             ORDER BY event_id ASC;",
        )?;
        let mut rows = stmt.query([id.0])?;
        while let Some(row) = rows.next()? {
            participant.record_event(EventId(row.get(0)?));
        }

        Ok(Some(participant))
    }
}
