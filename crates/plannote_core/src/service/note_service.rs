//! Note use-case service.
//!
//! # Responsibility
//! - Seal note text before persistence and open it on reads.
//! - Enforce the ownership guard on every identity-scoped operation.
//! - Implement reschedule and duplicate-to-end-of-month date operations.
//! - Serve owner, calendar and day listings as decrypted summaries.
//!
//! # Invariants
//! - Existence and ownership are checked before any mutation.
//! - Fields absent from an update request are never touched.
//! - Duplication inserts copies one by one; a failure keeps the copies that
//!   were already saved and reports the error.
//! - Log lines carry ids and counts only, never note text or ciphertext.

use crate::access::{ensure_owner, AccessDenied};
use crate::cipher::{open_blocks, open_text, seal_blocks, seal_text, Cipher, CipherError};
use crate::model::note::{
    CalendarId, NewNote, Note, NoteDetail, NoteHeader, NoteId, NotePatch, NoteSummary,
    NoteValidationError, OwnerId,
};
use crate::repo::note_repo::NoteRepository;
use crate::repo::RepoError;
use crate::schedule::{duplicate_dates, start_of_day_utc, RepeatInterval, RepeatIntervalError};
use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Stable error classification exposed to the request layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AccessDenied,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::NotFound => "not_found",
            Self::AccessDenied => "access_denied",
            Self::Internal => "internal_error",
        }
    }
}

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Malformed or out-of-range caller input.
    Validation(String),
    /// Target note does not exist.
    NotFound(NoteId),
    /// Target note exists but belongs to another owner.
    AccessDenied(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Sealing/opening failure, including corrupted stored payloads.
    Cipher(CipherError),
}

impl NoteServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::Repo(_) | Self::Cipher(_) => ErrorKind::Internal,
        }
    }

    /// Caller-safe message: no ids, storage details or cipher output.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::NotFound(_) => "Note not found".to_string(),
            Self::AccessDenied(_) => "Access denied".to_string(),
            Self::Repo(_) | Self::Cipher(_) => "Internal error".to_string(),
        }
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::AccessDenied(id) => write!(f, "access denied to note {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Cipher(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Cipher(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<CipherError> for NoteServiceError {
    fn from(value: CipherError) -> Self {
        Self::Cipher(value)
    }
}

impl From<AccessDenied> for NoteServiceError {
    fn from(value: AccessDenied) -> Self {
        Self::AccessDenied(value.note_id)
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<RepeatIntervalError> for NoteServiceError {
    fn from(value: RepeatIntervalError) -> Self {
        Self::Validation(value.to_string())
    }
}

/// Note service facade over a repository and an injected cipher.
pub struct NoteService<R: NoteRepository, C: Cipher> {
    repo: R,
    cipher: C,
}

impl<R: NoteRepository, C: Cipher> NoteService<R, C> {
    /// Creates a service using the provided repository and cipher.
    pub fn new(repo: R, cipher: C) -> Self {
        Self { repo, cipher }
    }

    /// Read access to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates one note owned by `owner` and returns its id.
    ///
    /// Title and subject are sealed only when non-empty; block payloads are
    /// serialized then sealed, keeping their tags and order.
    pub fn create_note(&mut self, owner: &OwnerId, request: NewNote) -> NoteServiceResult<NoteId> {
        let result = self.create_note_inner(owner, request);
        log_outcome("note_create", None, &result);
        if let Ok(note_id) = &result {
            info!("event=note_create module=service status=ok note_id={note_id}");
        }
        result
    }

    fn create_note_inner(&mut self, owner: &OwnerId, request: NewNote) -> NoteServiceResult<NoteId> {
        let calendar_id = request.calendar_id.map(CalendarId::new).transpose()?;
        let title = seal_text(&self.cipher, request.title.as_deref().unwrap_or(""))?;
        let subject = seal_text(&self.cipher, request.subject.as_deref().unwrap_or(""))?;
        let content_blocks = seal_blocks(&self.cipher, &request.content_blocks)?;

        let note = Note::new(
            owner.clone(),
            title,
            subject,
            content_blocks,
            request.assigned_date,
            calendar_id,
        );
        Ok(self.repo.create_note(&note)?)
    }

    /// Returns one fully decrypted note owned by `owner`.
    pub fn get_note(&self, note_id: NoteId, owner: &OwnerId) -> NoteServiceResult<NoteDetail> {
        let result = self
            .load_owned(note_id, owner)
            .and_then(|note| self.open_detail(note));
        log_outcome("note_get", Some(note_id), &result);
        result
    }

    /// Returns one decrypted note owned by `owner` filed under `calendar`.
    ///
    /// A note filed under another calendar (or none) reports `NotFound`.
    pub fn get_note_in_calendar(
        &self,
        note_id: NoteId,
        owner: &OwnerId,
        calendar: &CalendarId,
    ) -> NoteServiceResult<NoteDetail> {
        let result = self.load_owned(note_id, owner).and_then(|note| {
            if note.calendar_id.as_ref() != Some(calendar) {
                return Err(NoteServiceError::NotFound(note_id));
            }
            self.open_detail(note)
        });
        log_outcome("note_get_in_calendar", Some(note_id), &result);
        result
    }

    /// Lists summaries of every note owned by `owner`, sorted by date.
    ///
    /// Content blocks are neither loaded nor returned.
    pub fn list_notes(&self, owner: &OwnerId) -> NoteServiceResult<Vec<NoteSummary>> {
        let result = self.list_summaries(owner, None, |_| true);
        log_outcome("note_list", None, &result);
        result
    }

    /// Lists summaries of `owner`'s notes filed under `calendar`.
    pub fn list_notes_for_calendar(
        &self,
        owner: &OwnerId,
        calendar: &CalendarId,
    ) -> NoteServiceResult<Vec<NoteSummary>> {
        let result = self.list_summaries(owner, Some(calendar), |_| true);
        log_outcome("note_list_calendar", None, &result);
        result
    }

    /// Lists summaries of `owner`'s notes assigned to one UTC calendar day.
    pub fn list_notes_for_day(
        &self,
        owner: &OwnerId,
        day: NaiveDate,
    ) -> NoteServiceResult<Vec<NoteSummary>> {
        let result = self.list_summaries(owner, None, |header| {
            header.assigned_date.date_naive() == day
        });
        log_outcome("note_list_day", None, &result);
        result
    }

    fn list_summaries(
        &self,
        owner: &OwnerId,
        calendar: Option<&CalendarId>,
        keep: impl Fn(&NoteHeader) -> bool,
    ) -> NoteServiceResult<Vec<NoteSummary>> {
        let headers = self.repo.list_note_headers(owner, calendar)?;
        headers
            .into_iter()
            .filter(|header| keep(header))
            .map(|header| {
                Ok(NoteSummary {
                    id: header.id,
                    title: open_text(&self.cipher, &header.title)?,
                    subject: open_text(&self.cipher, &header.subject)?,
                    assigned_date: header.assigned_date,
                    calendar_id: header.calendar_id,
                    is_done: header.is_done,
                })
            })
            .collect()
    }

    fn open_detail(&self, note: Note) -> NoteServiceResult<NoteDetail> {
        Ok(NoteDetail {
            id: note.id,
            title: open_text(&self.cipher, &note.title)?,
            subject: open_text(&self.cipher, &note.subject)?,
            assigned_date: note.assigned_date,
            is_done: note.is_done,
            calendar_id: note.calendar_id,
            content_blocks: open_blocks(&self.cipher, &note.content_blocks)?,
        })
    }

    /// Applies only the fields present in `patch`.
    ///
    /// `Some("")` clears title/subject to the empty sentinel; supplied
    /// `content_blocks` replace the whole previous sequence. `updated_at` is
    /// bumped even when the patch carries no fields.
    pub fn update_note(
        &mut self,
        note_id: NoteId,
        owner: &OwnerId,
        patch: NotePatch,
    ) -> NoteServiceResult<()> {
        let result = self.update_note_inner(note_id, owner, patch);
        log_outcome("note_update", Some(note_id), &result);
        result
    }

    fn update_note_inner(
        &mut self,
        note_id: NoteId,
        owner: &OwnerId,
        patch: NotePatch,
    ) -> NoteServiceResult<()> {
        let mut note = self.load_owned(note_id, owner)?;

        if let Some(title) = patch.title.as_deref() {
            note.title = seal_text(&self.cipher, title)?;
        }
        if let Some(subject) = patch.subject.as_deref() {
            note.subject = seal_text(&self.cipher, subject)?;
        }
        if let Some(blocks) = patch.content_blocks.as_deref() {
            note.content_blocks = seal_blocks(&self.cipher, blocks)?;
        }
        if let Some(assigned_date) = patch.assigned_date {
            note.assigned_date = assigned_date;
        }

        note.touch();
        self.repo.save_note(&note)?;
        Ok(())
    }

    /// Deletes one note owned by `owner`.
    pub fn delete_note(&mut self, note_id: NoteId, owner: &OwnerId) -> NoteServiceResult<()> {
        let result = self
            .load_owned(note_id, owner)
            .and_then(|note| Ok(self.repo.delete_note(note.id)?));
        log_outcome("note_delete", Some(note_id), &result);
        result
    }

    /// Flips the completion flag and returns its new value.
    pub fn toggle_done(&mut self, note_id: NoteId, owner: &OwnerId) -> NoteServiceResult<bool> {
        let result = self.load_owned(note_id, owner).and_then(|mut note| {
            note.is_done = !note.is_done;
            note.touch();
            self.repo.save_note(&note)?;
            Ok(note.is_done)
        });
        log_outcome("note_toggle_done", Some(note_id), &result);
        result
    }

    /// Moves a note to the start (00:00 UTC) of the supplied date's day.
    ///
    /// Returns the stored, normalized date.
    pub fn reschedule_note(
        &mut self,
        note_id: NoteId,
        owner: &OwnerId,
        assigned_date: Option<DateTime<Utc>>,
    ) -> NoteServiceResult<DateTime<Utc>> {
        let result = self.reschedule_note_inner(note_id, owner, assigned_date);
        log_outcome("note_reschedule", Some(note_id), &result);
        result
    }

    fn reschedule_note_inner(
        &mut self,
        note_id: NoteId,
        owner: &OwnerId,
        assigned_date: Option<DateTime<Utc>>,
    ) -> NoteServiceResult<DateTime<Utc>> {
        let assigned_date = assigned_date
            .ok_or_else(|| NoteServiceError::Validation("missing assigned date".to_string()))?;
        let normalized = start_of_day_utc(assigned_date);

        let mut note = self.load_owned(note_id, owner)?;
        note.assigned_date = normalized;
        note.touch();
        self.repo.save_note(&note)?;
        Ok(normalized)
    }

    /// Copies a note every `repeat_interval` days until the end of its month.
    ///
    /// Copies share the source's sealed fields verbatim and start not done.
    /// Returns how many copies were created; zero when the first repeat
    /// already falls in the next month.
    pub fn duplicate_to_end_of_month(
        &mut self,
        note_id: NoteId,
        owner: &OwnerId,
        repeat_interval: i64,
    ) -> NoteServiceResult<usize> {
        let result = self.duplicate_to_end_of_month_inner(note_id, owner, repeat_interval);
        log_outcome("note_duplicate", Some(note_id), &result);
        result
    }

    fn duplicate_to_end_of_month_inner(
        &mut self,
        note_id: NoteId,
        owner: &OwnerId,
        repeat_interval: i64,
    ) -> NoteServiceResult<usize> {
        let interval = RepeatInterval::new(repeat_interval)?;
        let source = self.load_owned(note_id, owner)?;

        let mut created = 0;
        for date in duplicate_dates(source.assigned_date, interval) {
            if let Err(err) = self.repo.create_note(&source.duplicate_at(date)) {
                error!(
                    "event=note_duplicate module=service status=partial note_id={note_id} created={created}"
                );
                return Err(err.into());
            }
            created += 1;
        }

        info!(
            "event=note_duplicate module=service status=ok note_id={note_id} interval_days={} created={created}",
            interval.days()
        );
        Ok(created)
    }

    /// Loads a note and applies the ownership guard.
    fn load_owned(&self, note_id: NoteId, owner: &OwnerId) -> NoteServiceResult<Note> {
        let note = self
            .repo
            .get_note(note_id)?
            .ok_or(NoteServiceError::NotFound(note_id))?;
        ensure_owner(owner, &note)?;
        Ok(note)
    }
}

fn log_outcome<T>(event: &str, note_id: Option<NoteId>, result: &NoteServiceResult<T>) {
    let Err(err) = result else {
        return;
    };
    let note_id = note_id.map_or_else(|| "-".to_string(), |id| id.to_string());
    let error_code = err.kind().as_str();
    match err.kind() {
        ErrorKind::Internal => error!(
            "event={event} module=service status=error note_id={note_id} error_code={error_code} error={err}"
        ),
        _ => info!(
            "event={event} module=service status=rejected note_id={note_id} error_code={error_code}"
        ),
    }
}
