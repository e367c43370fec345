//! Message encryption using XSalsa20-Poly1305.

use crypto_secretbox::{
    Nonce, XSalsa20Poly1305,
    aead::{Aead, KeyInit},
};

use super::{error::SenderKeyError, ratchet::MessageKey};

/// Secretbox nonce size (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes).
pub(crate) const TAG_SIZE: usize = 16;

/// Encrypt one message under a message key. The ciphertext is the
/// plaintext length plus the 16-byte tag.
pub(crate) fn seal_message(plaintext: &[u8], key: &MessageKey, nonce: &[u8; NONCE_SIZE]) -> Vec<u8> {
    let cipher = XSalsa20Poly1305::new(key.key().into());

    let Ok(ciphertext) = cipher.encrypt(Nonce::from_slice(nonce), plaintext) else {
        unreachable!("XSalsa20-Poly1305 encryption cannot fail with valid inputs");
    };

    ciphertext
}

/// Open one message. Fails on any tampering or key mismatch.
pub(crate) fn open_message(
    ciphertext: &[u8],
    key: &MessageKey,
    nonce: &[u8; NONCE_SIZE],
) -> Result<Vec<u8>, SenderKeyError> {
    let cipher = XSalsa20Poly1305::new(key.key().into());

    cipher.decrypt(Nonce::from_slice(nonce), ciphertext).map_err(|_| {
        SenderKeyError::DecryptFailed { reason: "authentication failed".to_string() }
    })
}
