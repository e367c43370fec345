//! Symmetric chain ratchet for forward-secure message key derivation.
//!
//! # Security Properties
//!
//! - Forward Secrecy: old chain keys are overwritten when advancing
//! - Key Uniqueness: each chain index produces a unique message key
//! - Determinism: the same chain key always produces the same sequence

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

use super::error::SenderKeyError;

type HmacSha256 = Hmac<Sha256>;

/// Domain separator for deriving a message key.
const MESSAGE_KEY_SEED: &[u8] = &[0x01];

/// Domain separator for deriving the next chain key. Distinct from
/// [`MESSAGE_KEY_SEED`] so a message key never equals a chain key.
const CHAIN_KEY_SEED: &[u8] = &[0x02];

/// Maximum number of chain steps a receiver will skip when catching up.
/// Caps the work done for lossy delivery; a gap of exactly this size is
/// still accepted.
pub const MAX_SKIP: u32 = 256;

/// A message key derived from the chain.
///
/// Used for a single message encryption or decryption, then discarded.
#[derive(Clone, Debug)]
pub struct MessageKey {
    /// 32-byte symmetric key for XSalsa20-Poly1305
    key: [u8; 32],
    /// Chain index this key was derived at
    index: u32,
}

impl MessageKey {
    /// 32-byte symmetric key for the secretbox AEAD.
    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }

    /// Chain index this key was derived at.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl Drop for MessageKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Forward-only chain of message keys.
///
/// Each [`advance()`](Self::advance) call:
/// 1. Derives a message key from the current chain key
/// 2. Derives the next chain key
/// 3. Overwrites the old chain key (forward secrecy)
/// 4. Increments the chain index
///
/// Cloning is a deep copy; the sender's self-decrypt clone ratchets
/// independently of the original.
#[derive(Clone, Debug)]
pub(crate) struct ChainRatchet {
    chain_key: [u8; 32],
    index: u32,
}

impl ChainRatchet {
    /// Start a chain at index 0 from an initial chain key.
    pub(crate) fn new(chain_key: [u8; 32]) -> Self {
        Self { chain_key, index: 0 }
    }

    /// Restore a chain at a given index, e.g. from a distribution payload.
    pub(crate) fn from_parts(chain_key: [u8; 32], index: u32) -> Self {
        Self { chain_key, index }
    }

    /// Current chain index: the number of steps taken so far.
    pub(crate) fn index(&self) -> u32 {
        self.index
    }

    /// Current chain key bytes, for distribution payload snapshots.
    pub(crate) fn chain_key(&self) -> &[u8; 32] {
        &self.chain_key
    }

    /// Advance one step and return the message key for the index the
    /// chain was at before advancing.
    pub(crate) fn advance(&mut self) -> MessageKey {
        let message_key = self.derive(MESSAGE_KEY_SEED);
        let next_chain_key = self.derive(CHAIN_KEY_SEED);

        // Overwrite the old chain key for forward secrecy
        self.chain_key.zeroize();
        self.chain_key = next_chain_key;

        let index = self.index;
        self.index = self.index.wrapping_add(1);

        MessageKey { key: message_key, index }
    }

    /// Advance to a target index, discarding intermediate message keys,
    /// and return the message key for `target`.
    ///
    /// # Errors
    ///
    /// - `AlreadyConsumed` if `target` is behind the current index
    /// - `TooManySkipped` if the gap exceeds [`MAX_SKIP`]
    pub(crate) fn advance_to(&mut self, target: u32) -> Result<MessageKey, SenderKeyError> {
        if target < self.index {
            return Err(SenderKeyError::AlreadyConsumed { current: self.index, requested: target });
        }

        let skip = target - self.index;
        if skip > MAX_SKIP {
            return Err(SenderKeyError::TooManySkipped { current: self.index, requested: target });
        }

        let mut message_key = self.advance();
        while message_key.index() < target {
            message_key = self.advance();
        }

        Ok(message_key)
    }

    /// HMAC-SHA256 of a one-byte domain separator under the chain key.
    fn derive(&self, seed: &[u8]) -> [u8; 32] {
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.chain_key) else {
            unreachable!("HMAC-SHA256 accepts any key size");
        };
        mac.update(seed);
        let result = mac.finalize().into_bytes();

        let mut key = [0u8; 32];
        key.copy_from_slice(&result);
        key
    }
}

impl Drop for ChainRatchet {
    fn drop(&mut self) {
        self.chain_key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_chain_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn new_chain_starts_at_index_zero() {
        let ratchet = ChainRatchet::new(test_chain_key());
        assert_eq!(ratchet.index(), 0);
    }

    #[test]
    fn advance_increments_index() {
        let mut ratchet = ChainRatchet::new(test_chain_key());

        let key0 = ratchet.advance();
        assert_eq!(key0.index(), 0);
        assert_eq!(ratchet.index(), 1);

        let key1 = ratchet.advance();
        assert_eq!(key1.index(), 1);
        assert_eq!(ratchet.index(), 2);
    }

    #[test]
    fn advance_produces_unique_keys() {
        let mut ratchet = ChainRatchet::new(test_chain_key());

        let key0 = ratchet.advance();
        let key1 = ratchet.advance();
        let key2 = ratchet.advance();

        assert_ne!(key0.key(), key1.key(), "keys must be unique");
        assert_ne!(key1.key(), key2.key(), "keys must be unique");
        assert_ne!(key0.key(), key2.key(), "keys must be unique");
    }

    #[test]
    fn message_key_differs_from_next_chain_key() {
        // The two domain separators must keep the derivations apart
        let mut ratchet = ChainRatchet::new(test_chain_key());
        let message_key = ratchet.advance();
        assert_ne!(message_key.key(), ratchet.chain_key());
    }

    #[test]
    fn ratchet_is_deterministic() {
        let chain_key = test_chain_key();

        let mut a = ChainRatchet::new(chain_key);
        let mut b = ChainRatchet::new(chain_key);

        for _ in 0..10 {
            let key_a = a.advance();
            let key_b = b.advance();
            assert_eq!(key_a.key(), key_b.key(), "same chain key must produce same keys");
            assert_eq!(key_a.index(), key_b.index());
        }
    }

    #[test]
    fn different_chain_keys_produce_different_keys() {
        let mut key_a = [0u8; 32];
        let mut key_b = [0u8; 32];
        key_a[0] = 1;
        key_b[0] = 2;

        let mut a = ChainRatchet::new(key_a);
        let mut b = ChainRatchet::new(key_b);

        assert_ne!(a.advance().key(), b.advance().key());
    }

    #[test]
    fn clone_ratchets_independently() {
        let mut original = ChainRatchet::new(test_chain_key());
        let mut copy = original.clone();

        let from_original = original.advance();
        assert_eq!(copy.index(), 0, "clone must not observe the original's advance");

        let from_copy = copy.advance();
        assert_eq!(from_original.key(), from_copy.key());
    }

    #[test]
    fn advance_to_current_index() {
        let mut ratchet = ChainRatchet::new(test_chain_key());

        let key = ratchet.advance_to(0).unwrap();
        assert_eq!(key.index(), 0);
        assert_eq!(ratchet.index(), 1);
    }

    #[test]
    fn advance_to_skips_forward() {
        let mut ratchet = ChainRatchet::new(test_chain_key());

        let key = ratchet.advance_to(5).unwrap();
        assert_eq!(key.index(), 5);
        assert_eq!(ratchet.index(), 6);
    }

    #[test]
    fn advance_to_matches_sequential_advance() {
        let chain_key = test_chain_key();

        let mut sequential = ChainRatchet::new(chain_key);
        for _ in 0..5 {
            sequential.advance();
        }
        let key_sequential = sequential.advance();

        let mut skipping = ChainRatchet::new(chain_key);
        let key_skipped = skipping.advance_to(5).unwrap();

        assert_eq!(
            key_sequential.key(),
            key_skipped.key(),
            "skip and sequential must produce same key"
        );
    }

    #[test]
    fn advance_to_rejects_consumed_index() {
        let mut ratchet = ChainRatchet::new(test_chain_key());
        ratchet.advance_to(5).unwrap();

        let result = ratchet.advance_to(3);
        assert_eq!(
            result.unwrap_err(),
            SenderKeyError::AlreadyConsumed { current: 6, requested: 3 }
        );
    }

    #[test]
    fn skip_window_boundary() {
        // A gap of exactly MAX_SKIP succeeds; one more fails
        let mut at_limit = ChainRatchet::new(test_chain_key());
        let key = at_limit.advance_to(MAX_SKIP).unwrap();
        assert_eq!(key.index(), MAX_SKIP);
        assert_eq!(at_limit.index(), MAX_SKIP + 1);

        let mut past_limit = ChainRatchet::new(test_chain_key());
        let result = past_limit.advance_to(MAX_SKIP + 1);
        assert_eq!(
            result.unwrap_err(),
            SenderKeyError::TooManySkipped { current: 0, requested: MAX_SKIP + 1 }
        );
        assert_eq!(past_limit.index(), 0, "failed skip must not advance the chain");
    }

    #[test]
    fn message_key_has_32_byte_key() {
        let mut ratchet = ChainRatchet::new(test_chain_key());
        assert_eq!(ratchet.advance().key().len(), 32);
    }
}
