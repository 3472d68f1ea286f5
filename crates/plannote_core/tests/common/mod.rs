//! Shared fixtures for note core integration tests.
#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use plannote_core::{Cipher, CipherError, ContentBlock, NewNote, OwnerId};
use std::cell::Cell;

/// Reversible fake cipher: `v1:<counter>:<base64>`.
///
/// The counter makes every encryption of the same text produce different
/// bytes, so re-encryption is observable in storage.
#[derive(Default)]
pub struct TestCipher {
    counter: Cell<u64>,
}

impl TestCipher {
    pub fn encrypt_calls(&self) -> u64 {
        self.counter.get()
    }
}

impl Cipher for TestCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let next = self.counter.get() + 1;
        self.counter.set(next);
        Ok(format!("v1:{next}:{}", STANDARD.encode(plaintext)))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let body = ciphertext
            .strip_prefix("v1:")
            .and_then(|rest| rest.split_once(':'))
            .map(|(_, encoded)| encoded)
            .ok_or_else(|| CipherError::Decrypt("unrecognized ciphertext envelope".to_string()))?;
        let bytes = STANDARD
            .decode(body)
            .map_err(|err| CipherError::Decrypt(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| CipherError::Decrypt(err.to_string()))
    }
}

pub fn owner(value: &str) -> OwnerId {
    OwnerId::new(value).unwrap()
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

pub fn new_note(title: &str, subject: &str, blocks: Vec<ContentBlock>, date: DateTime<Utc>) -> NewNote {
    NewNote {
        title: Some(title.to_string()),
        subject: Some(subject.to_string()),
        content_blocks: blocks,
        assigned_date: date,
        calendar_id: None,
    }
}
