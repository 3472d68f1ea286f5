//! Core domain logic for encrypted calendar notes.
//! This crate owns note sealing, ownership checks and date arithmetic.

pub mod access;
pub mod cipher;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use access::{ensure_owner, AccessDenied};
pub use cipher::{Cipher, CipherError};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{
    BlockType, CalendarId, ContentBlock, NewNote, Note, NoteDetail, NoteHeader, NoteId,
    NotePatch, NoteSummary, NoteValidationError, OwnerId, SealedBlock,
};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::{RepoError, RepoResult};
pub use schedule::{RepeatInterval, RepeatIntervalError};
pub use service::note_service::{ErrorKind, NoteService, NoteServiceError, NoteServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
