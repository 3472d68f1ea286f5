//! Cipher capability used to keep note text encrypted at rest.
//!
//! # Responsibility
//! - Define the injected encrypt/decrypt contract.
//! - Provide sealing helpers applying the empty-text sentinel and block
//!   payload serialization.
//!
//! # Invariants
//! - Core never hardwires a concrete cipher; callers inject one.
//! - `decrypt(encrypt(x)) == x` for every `x` produced by the same cipher.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod seal;

pub use seal::{open_blocks, open_text, seal_blocks, seal_text};

/// Encrypt/decrypt capability supplied by a trusted component.
pub trait Cipher {
    /// Encrypts plaintext into a storable ciphertext string.
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;
    /// Reverses `encrypt`. Fails on corrupted or foreign ciphertext.
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

impl<C: Cipher + ?Sized> Cipher for &C {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        (**self).decrypt(ciphertext)
    }
}

impl<C: Cipher + ?Sized> Cipher for Box<C> {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        (**self).decrypt(ciphertext)
    }
}

/// Failure while sealing or opening note content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    Encrypt(String),
    Decrypt(String),
    /// Block payload could not be serialized before encryption.
    Serialize(String),
    /// Decrypted block payload is not valid JSON.
    Parse(String),
}

impl Display for CipherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encrypt(message) => write!(f, "encryption failed: {message}"),
            Self::Decrypt(message) => write!(f, "decryption failed: {message}"),
            Self::Serialize(message) => write!(f, "block payload serialization failed: {message}"),
            Self::Parse(message) => write!(f, "block payload parse failed: {message}"),
        }
    }
}

impl Error for CipherError {}
