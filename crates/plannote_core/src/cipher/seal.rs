//! Sealing rules shared by every note write/read path.

use super::{Cipher, CipherError};
use crate::model::note::{ContentBlock, SealedBlock};

/// Encrypts `plaintext`, keeping the empty string as a literal sentinel.
pub fn seal_text<C: Cipher + ?Sized>(cipher: &C, plaintext: &str) -> Result<String, CipherError> {
    if plaintext.is_empty() {
        return Ok(String::new());
    }
    cipher.encrypt(plaintext)
}

/// Reverses `seal_text`. The empty sentinel opens to `""` without decrypting.
pub fn open_text<C: Cipher + ?Sized>(cipher: &C, sealed: &str) -> Result<String, CipherError> {
    if sealed.is_empty() {
        return Ok(String::new());
    }
    cipher.decrypt(sealed)
}

/// Serializes and encrypts every block payload, preserving tag and order.
pub fn seal_blocks<C: Cipher + ?Sized>(
    cipher: &C,
    blocks: &[ContentBlock],
) -> Result<Vec<SealedBlock>, CipherError> {
    blocks
        .iter()
        .map(|block| {
            let serialized = serde_json::to_string(&block.data)
                .map_err(|err| CipherError::Serialize(err.to_string()))?;
            Ok(SealedBlock {
                kind: block.kind,
                data: cipher.encrypt(&serialized)?,
            })
        })
        .collect()
}

/// Decrypts and parses every block payload back into structured form.
pub fn open_blocks<C: Cipher + ?Sized>(
    cipher: &C,
    blocks: &[SealedBlock],
) -> Result<Vec<ContentBlock>, CipherError> {
    blocks
        .iter()
        .map(|block| {
            let serialized = cipher.decrypt(&block.data)?;
            let data = serde_json::from_str(&serialized)
                .map_err(|err| CipherError::Parse(err.to_string()))?;
            Ok(ContentBlock {
                kind: block.kind,
                data,
            })
        })
        .collect()
}
