//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted (sealed) note record and its content blocks.
//! - Define request/read models exchanged with service callers.
//!
//! # Invariants
//! - `id` and `owner_id` never change after construction.
//! - Non-empty `title`/`subject` on a persisted `Note` are ciphertext; empty
//!   values are stored as literal empty strings.
//! - `content_blocks` order is meaningful and preserved end to end.
//! - `updated_at` is never earlier than `created_at`.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a persisted note.
pub type NoteId = Uuid;

/// Identity of the user owning a note.
///
/// Stored trimmed, so comparisons are made on the normalized text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Builds an owner id from caller-supplied text.
    ///
    /// # Errors
    /// - Returns `NoteValidationError::EmptyOwner` when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, NoteValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(NoteValidationError::EmptyOwner);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = NoteValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OwnerId> for String {
    fn from(value: OwnerId) -> Self {
        value.0
    }
}

/// Identifier of the calendar a note is grouped under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarId(String);

impl CalendarId {
    /// Builds a calendar id from caller-supplied text.
    ///
    /// # Errors
    /// - Returns `NoteValidationError::EmptyCalendar` when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, NoteValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(NoteValidationError::EmptyCalendar);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CalendarId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CalendarId {
    type Error = NoteValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CalendarId> for String {
    fn from(value: CalendarId) -> Self {
        value.0
    }
}

/// Closed set of content block tags.
///
/// The tag only drives rendering; every block is sealed the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Free-form text.
    Text,
    /// Source code snippet.
    Code,
    /// Generic page block.
    Page,
    /// Birthday reminder.
    Birthday,
}

impl BlockType {
    /// Stable storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::Page => "page",
            Self::Birthday => "birthday",
        }
    }

    /// Parses a stored tag value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "code" => Some(Self::Code),
            "page" => Some(Self::Page),
            "birthday" => Some(Self::Birthday),
            _ => None,
        }
    }
}

/// Plaintext content block as supplied by and returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: BlockType,
    /// Arbitrary structured payload.
    pub data: Value,
}

impl ContentBlock {
    pub fn new(kind: BlockType, data: impl Into<Value>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }
}

/// Content block as persisted: `data` holds ciphertext of the serialized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlock {
    pub kind: BlockType,
    pub data: String,
}

/// Persisted note record with sealed text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub owner_id: OwnerId,
    pub calendar_id: Option<CalendarId>,
    /// Ciphertext, or `""` for "no title".
    pub title: String,
    /// Ciphertext, or `""` for "no subject".
    pub subject: String,
    pub content_blocks: Vec<SealedBlock>,
    pub assigned_date: DateTime<Utc>,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a new, not-done note with a generated id.
    ///
    /// Text fields are expected to be sealed already.
    pub fn new(
        owner_id: OwnerId,
        title: String,
        subject: String,
        content_blocks: Vec<SealedBlock>,
        assigned_date: DateTime<Utc>,
        calendar_id: Option<CalendarId>,
    ) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            calendar_id,
            title,
            subject,
            content_blocks,
            assigned_date,
            is_done: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builds a fresh copy of this note scheduled on `assigned_date`.
    ///
    /// Sealed fields are copied verbatim; identity, completion flag and
    /// timestamps are new.
    pub fn duplicate_at(&self, assigned_date: DateTime<Utc>) -> Self {
        Self::new(
            self.owner_id.clone(),
            self.title.clone(),
            self.subject.clone(),
            self.content_blocks.clone(),
            assigned_date,
            self.calendar_id.clone(),
        )
    }

    /// Refreshes `updated_at`, never moving it before `created_at`.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.created_at);
    }

    /// Checks record-level invariants before persistence and after load.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.owner_id.as_str().trim().is_empty() {
            return Err(NoteValidationError::EmptyOwner);
        }
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::UpdatedBeforeCreated);
        }
        if let Some(position) = self
            .content_blocks
            .iter()
            .position(|block| block.data.is_empty())
        {
            return Err(NoteValidationError::EmptyBlockPayload(position));
        }
        Ok(())
    }
}

/// Sealed note columns without content blocks, as read by list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteHeader {
    pub id: NoteId,
    pub owner_id: OwnerId,
    pub calendar_id: Option<CalendarId>,
    pub title: String,
    pub subject: String,
    pub assigned_date: DateTime<Utc>,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteHeader {
    /// Checks the row-level invariants that do not involve blocks.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.owner_id.as_str().trim().is_empty() {
            return Err(NoteValidationError::EmptyOwner);
        }
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::UpdatedBeforeCreated);
        }
        Ok(())
    }

    /// Attaches the ordered block sequence loaded for this note.
    pub fn with_blocks(self, content_blocks: Vec<SealedBlock>) -> Note {
        Note {
            id: self.id,
            owner_id: self.owner_id,
            calendar_id: self.calendar_id,
            title: self.title,
            subject: self.subject,
            content_blocks,
            assigned_date: self.assigned_date,
            is_done: self.is_done,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Current instant at the millisecond precision the store keeps.
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Validation failures for note input and persisted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyOwner,
    EmptyCalendar,
    UpdatedBeforeCreated,
    /// Sealed block at the given position has no payload.
    EmptyBlockPayload(usize),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyOwner => write!(f, "owner id must not be empty"),
            Self::EmptyCalendar => write!(f, "calendar id must not be empty when supplied"),
            Self::UpdatedBeforeCreated => write!(f, "updated_at is earlier than created_at"),
            Self::EmptyBlockPayload(position) => {
                write!(f, "content block {position} has an empty sealed payload")
            }
        }
    }
}

impl Error for NoteValidationError {}

/// Create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNote {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
    pub assigned_date: DateTime<Utc>,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

/// Partial update request.
///
/// `None` means "not supplied"; `Some("")` explicitly clears a text field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content_blocks: Option<Vec<ContentBlock>>,
    #[serde(default)]
    pub assigned_date: Option<DateTime<Utc>>,
}

/// Fully decrypted note returned by single-note reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteDetail {
    pub id: NoteId,
    pub title: String,
    pub subject: String,
    pub assigned_date: DateTime<Utc>,
    pub is_done: bool,
    pub calendar_id: Option<CalendarId>,
    pub content_blocks: Vec<ContentBlock>,
}

/// List projection: decrypted summary fields only, no content blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteSummary {
    pub id: NoteId,
    pub title: String,
    pub subject: String,
    pub assigned_date: DateTime<Utc>,
    pub calendar_id: Option<CalendarId>,
    pub is_done: bool,
}
