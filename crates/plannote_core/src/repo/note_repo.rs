//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist sealed note records and their ordered content blocks.
//! - Provide owner-scoped listing for calendar views.
//! - Serve list views from note rows alone, without touching `note_blocks`.
//!
//! # Invariants
//! - A note row and its block rows are written in one transaction.
//! - `save_note` never rewrites `owner_id` or `created_at`.
//! - Block order is stored explicitly in `note_blocks.position`.
//! - Owner listing is sorted by `assigned_date ASC, id ASC`.

use crate::model::note::{BlockType, CalendarId, Note, NoteHeader, NoteId, OwnerId, SealedBlock};
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    calendar_id,
    title,
    subject,
    assigned_date,
    is_done,
    created_at,
    updated_at
FROM notes";

/// Persistence contract for sealed note records.
///
/// Implementations store whatever they are given; sealing and ownership
/// checks belong to the service layer.
pub trait NoteRepository {
    /// Inserts one note with its blocks and returns its id.
    fn create_note(&mut self, note: &Note) -> RepoResult<NoteId>;
    /// Loads one note by id, `None` when absent.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Loads every note owned by `owner`, blocks included.
    fn list_notes_by_owner(&self, owner: &OwnerId) -> RepoResult<Vec<Note>>;
    /// Loads block-less headers of `owner`'s notes, optionally limited to one
    /// calendar. Same ordering as `list_notes_by_owner`.
    fn list_note_headers(
        &self,
        owner: &OwnerId,
        calendar: Option<&CalendarId>,
    ) -> RepoResult<Vec<NoteHeader>>;
    /// Overwrites mutable fields and replaces the full block sequence.
    fn save_note(&mut self, note: &Note) -> RepoResult<()>;
    /// Removes one note and its blocks.
    fn delete_note(&mut self, id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `RepoError::MissingRequiredTable` when migrations were not applied.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        for table in ["notes", "note_blocks"] {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    /// Returns the number of stored notes across all owners.
    pub fn count_notes(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative note count `{count}`")))
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&mut self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO notes (
                id,
                owner_id,
                calendar_id,
                title,
                subject,
                assigned_date,
                is_done,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                note.id.to_string(),
                note.owner_id.as_str(),
                note.calendar_id.as_ref().map(CalendarId::as_str),
                note.title.as_str(),
                note.subject.as_str(),
                note.assigned_date.timestamp_millis(),
                bool_to_int(note.is_done),
                note.created_at.timestamp_millis(),
                note.updated_at.timestamp_millis(),
            ],
        )?;
        insert_blocks(&tx, note.id, &note.content_blocks)?;
        tx.commit()?;

        Ok(note.id)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let header = parse_header_row(row)?;
            let blocks = load_blocks(self.conn, header.id)?;
            let note = header.with_blocks(blocks);
            note.validate()?;
            return Ok(Some(note));
        }

        Ok(None)
    }

    fn list_notes_by_owner(&self, owner: &OwnerId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY assigned_date ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let header = parse_header_row(row)?;
            let blocks = load_blocks(self.conn, header.id)?;
            let note = header.with_blocks(blocks);
            note.validate()?;
            notes.push(note);
        }

        Ok(notes)
    }

    fn list_note_headers(
        &self,
        owner: &OwnerId,
        calendar: Option<&CalendarId>,
    ) -> RepoResult<Vec<NoteHeader>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_id = ?1
               AND (?2 IS NULL OR calendar_id = ?2)
             ORDER BY assigned_date ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![owner.as_str(), calendar.map(CalendarId::as_str)])?;
        let mut headers = Vec::new();
        while let Some(row) = rows.next()? {
            let header = parse_header_row(row)?;
            header.validate()?;
            headers.push(header);
        }

        Ok(headers)
    }

    fn save_note(&mut self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notes
             SET
                calendar_id = ?2,
                title = ?3,
                subject = ?4,
                assigned_date = ?5,
                is_done = ?6,
                updated_at = ?7
             WHERE id = ?1;",
            params![
                note.id.to_string(),
                note.calendar_id.as_ref().map(CalendarId::as_str),
                note.title.as_str(),
                note.subject.as_str(),
                note.assigned_date.timestamp_millis(),
                bool_to_int(note.is_done),
                note.updated_at.timestamp_millis(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note.id));
        }

        tx.execute(
            "DELETE FROM note_blocks WHERE note_id = ?1;",
            [note.id.to_string()],
        )?;
        insert_blocks(&tx, note.id, &note.content_blocks)?;
        tx.commit()?;

        Ok(())
    }

    fn delete_note(&mut self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn insert_blocks(tx: &Transaction<'_>, note_id: NoteId, blocks: &[SealedBlock]) -> RepoResult<()> {
    let note_id = note_id.to_string();
    let mut stmt = tx.prepare(
        "INSERT INTO note_blocks (note_id, position, block_type, data)
         VALUES (?1, ?2, ?3, ?4);",
    )?;
    for (position, block) in blocks.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| RepoError::InvalidData(format!("block position {position} overflows")))?;
        stmt.execute(params![
            note_id.as_str(),
            position,
            block.kind.as_str(),
            block.data.as_str(),
        ])?;
    }
    Ok(())
}

fn load_blocks(conn: &Connection, note_id: NoteId) -> RepoResult<Vec<SealedBlock>> {
    let mut stmt = conn.prepare(
        "SELECT block_type, data
         FROM note_blocks
         WHERE note_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([note_id.to_string()])?;
    let mut blocks = Vec::new();
    while let Some(row) = rows.next()? {
        let type_text: String = row.get("block_type")?;
        let kind = BlockType::parse(&type_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid block type `{type_text}` in note_blocks.block_type"
            ))
        })?;
        blocks.push(SealedBlock {
            kind,
            data: row.get("data")?,
        });
    }
    Ok(blocks)
}

/// Parses the note columns; blocks are loaded separately.
fn parse_header_row(row: &Row<'_>) -> RepoResult<NoteHeader> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id")))?;

    let owner_text: String = row.get("owner_id")?;
    let owner_id = OwnerId::new(owner_text)?;
    let calendar_id = match row.get::<_, Option<String>>("calendar_id")? {
        Some(value) => Some(CalendarId::new(value)?),
        None => None,
    };

    let is_done = match row.get::<_, i64>("is_done")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_done value `{other}` in notes.is_done"
            )));
        }
    };

    Ok(NoteHeader {
        id,
        owner_id,
        calendar_id,
        title: row.get("title")?,
        subject: row.get("subject")?,
        assigned_date: millis_to_utc(row.get("assigned_date")?, "assigned_date")?,
        is_done,
        created_at: millis_to_utc(row.get("created_at")?, "created_at")?,
        updated_at: millis_to_utc(row.get("updated_at")?, "updated_at")?,
    })
}

fn millis_to_utc(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("out-of-range timestamp `{value}` in notes.{column}"))
    })
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
