//! Domain model for encrypted calendar notes.
//!
//! # Responsibility
//! - Define the canonical persisted note record (sealed form).
//! - Define plaintext request/read models used at the service boundary.
//!
//! # Invariants
//! - Plaintext only exists in request/read models, never in `Note`.

pub mod note;
