//! Sender key states and the distribution payload codec.
//!
//! A [`SenderKeyState`] is the mutable sending side of one distribution:
//! a random 16-byte distribution id plus a forward chain. The receiving
//! side, [`ReceivedSenderKey`], has the identical shape and is built from
//! a parsed distribution payload (or by cloning the sender's own state
//! for self-decryption).

use rand::{RngCore, rngs::OsRng};

use super::{
    error::SenderKeyError,
    ratchet::{ChainRatchet, MessageKey},
};

/// Length of a distribution id in bytes.
pub const DISTRIBUTION_ID_SIZE: usize = 16;

/// Length of a chain key in bytes.
pub const CHAIN_KEY_SIZE: usize = 32;

/// Fixed length of a distribution payload:
/// `distribution_id (16) ‖ chain_key (32) ‖ chain_index (4, LE)`.
pub const SKDM_PAYLOAD_SIZE: usize = DISTRIBUTION_ID_SIZE + CHAIN_KEY_SIZE + 4;

/// Mutable sender side of one key distribution.
///
/// # Invariants
///
/// - `distribution_id` is immutable after creation
/// - `chain_index` is monotonically non-decreasing
/// - every encryption overwrites the chain key
pub struct SenderKeyState {
    distribution_id: [u8; DISTRIBUTION_ID_SIZE],
    ratchet: ChainRatchet,
}

impl SenderKeyState {
    /// Restore a state from stored parts.
    pub fn from_parts(
        distribution_id: [u8; DISTRIBUTION_ID_SIZE],
        chain_key: [u8; CHAIN_KEY_SIZE],
        chain_index: u32,
    ) -> Self {
        Self { distribution_id, ratchet: ChainRatchet::from_parts(chain_key, chain_index) }
    }

    /// Identifier binding wire messages to this distribution.
    pub fn distribution_id(&self) -> &[u8; DISTRIBUTION_ID_SIZE] {
        &self.distribution_id
    }

    /// Number of messages encrypted so far.
    pub fn chain_index(&self) -> u32 {
        self.ratchet.index()
    }

    /// Deep-copy this state into a receiver for self-decryption.
    ///
    /// A sender who is also a group member clones its state immediately
    /// after generation, while the index is still 0; the clone then
    /// ratchets independently as the sender's own receiver.
    pub fn to_receiver(&self) -> ReceivedSenderKey {
        ReceivedSenderKey { distribution_id: self.distribution_id, ratchet: self.ratchet.clone() }
    }

    pub(crate) fn advance(&mut self) -> MessageKey {
        self.ratchet.advance()
    }

    pub(crate) fn chain_key(&self) -> &[u8; CHAIN_KEY_SIZE] {
        self.ratchet.chain_key()
    }
}

/// Per-sender receiver state for one distribution.
///
/// Same shape as [`SenderKeyState`]; the chain only moves forward, and at
/// index *i* its chain key equals the sender's at the same *i*.
#[derive(Debug)]
pub struct ReceivedSenderKey {
    distribution_id: [u8; DISTRIBUTION_ID_SIZE],
    ratchet: ChainRatchet,
}

impl ReceivedSenderKey {
    /// Restore a receiver from stored parts.
    pub fn from_parts(
        distribution_id: [u8; DISTRIBUTION_ID_SIZE],
        chain_key: [u8; CHAIN_KEY_SIZE],
        chain_index: u32,
    ) -> Self {
        Self { distribution_id, ratchet: ChainRatchet::from_parts(chain_key, chain_index) }
    }

    /// Identifier of the distribution this receiver follows.
    pub fn distribution_id(&self) -> &[u8; DISTRIBUTION_ID_SIZE] {
        &self.distribution_id
    }

    /// Next chain index this receiver expects.
    pub fn chain_index(&self) -> u32 {
        self.ratchet.index()
    }

    pub(crate) fn advance_to(&mut self, target: u32) -> Result<MessageKey, SenderKeyError> {
        self.ratchet.advance_to(target)
    }

    #[cfg(test)]
    pub(crate) fn chain_key(&self) -> &[u8; CHAIN_KEY_SIZE] {
        self.ratchet.chain_key()
    }
}

/// Generate a fresh sender key from the system CSPRNG.
///
/// Distinct calls yield distinct distribution ids and chain keys with
/// overwhelming probability. The chain starts at index 0.
pub fn generate_sender_key() -> SenderKeyState {
    let mut distribution_id = [0u8; DISTRIBUTION_ID_SIZE];
    OsRng.fill_bytes(&mut distribution_id);

    let mut chain_key = [0u8; CHAIN_KEY_SIZE];
    OsRng.fill_bytes(&mut chain_key);

    SenderKeyState { distribution_id, ratchet: ChainRatchet::new(chain_key) }
}

/// Serialize a sender key state into the fixed 52-byte distribution
/// payload.
pub fn create_skdm_payload(state: &SenderKeyState) -> [u8; SKDM_PAYLOAD_SIZE] {
    let mut payload = [0u8; SKDM_PAYLOAD_SIZE];
    payload[..16].copy_from_slice(&state.distribution_id);
    payload[16..48].copy_from_slice(state.chain_key());
    payload[48..].copy_from_slice(&state.chain_index().to_le_bytes());
    payload
}

/// Parse a distribution payload into a receiver state.
///
/// The three fields are read at fixed offsets; trailing bytes beyond 52
/// are ignored.
///
/// # Errors
///
/// - `SkdmTooShort` if the buffer holds fewer than 52 bytes
pub fn parse_skdm_payload(bytes: &[u8]) -> Result<ReceivedSenderKey, SenderKeyError> {
    if bytes.len() < SKDM_PAYLOAD_SIZE {
        return Err(SenderKeyError::SkdmTooShort { actual: bytes.len() });
    }

    let mut distribution_id = [0u8; DISTRIBUTION_ID_SIZE];
    distribution_id.copy_from_slice(&bytes[..16]);

    let mut chain_key = [0u8; CHAIN_KEY_SIZE];
    chain_key.copy_from_slice(&bytes[16..48]);

    let mut index_bytes = [0u8; 4];
    index_bytes.copy_from_slice(&bytes[48..52]);
    let chain_index = u32::from_le_bytes(index_bytes);

    Ok(ReceivedSenderKey { distribution_id, ratchet: ChainRatchet::from_parts(chain_key, chain_index) })
}
