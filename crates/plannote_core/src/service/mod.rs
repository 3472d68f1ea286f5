//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate sealing, ownership checks and repository calls.
//! - Keep request layers decoupled from storage and cipher details.

pub mod note_service;
