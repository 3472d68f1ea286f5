//! Ownership guard applied before every identity-scoped note operation.
//!
//! # Invariants
//! - Deny by default: only the exact (normalized) owner is allowed.
//! - A denial carries no note fields, only the requested id.

use crate::model::note::{Note, NoteId, OwnerId};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller is not the owner of the requested note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    pub note_id: NoteId,
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "access denied to note {}", self.note_id)
    }
}

impl Error for AccessDenied {}

/// Returns `Ok(())` only when `caller` owns `note`.
pub fn ensure_owner(caller: &OwnerId, note: &Note) -> Result<(), AccessDenied> {
    if note.owner_id.as_str() == caller.as_str() {
        return Ok(());
    }

    warn!(
        "event=access_denied module=access status=denied note_id={}",
        note.id
    );
    Err(AccessDenied { note_id: note.id })
}
