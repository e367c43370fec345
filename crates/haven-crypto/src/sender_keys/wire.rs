//! Wire codec for sender-key messages.
//!
//! Layout on the wire, little-endian where noted:
//!
//! ```text
//! offset  length  field
//!      0       1  type = 0x03
//!      1      16  distribution_id
//!     17       4  chain_index (u32 LE)
//!     21      24  nonce
//!     45     var  ciphertext + 16-byte tag
//! ```
//!
//! The header is structural only: parsing validates framing, not
//! authenticity. A message is trusted once the secretbox opens.

use bytes::BufMut;
use rand::{RngCore, rngs::OsRng};

use super::{
    encryption::{self, NONCE_SIZE},
    error::SenderKeyError,
    state::{DISTRIBUTION_ID_SIZE, ReceivedSenderKey, SenderKeyState},
};

/// Type byte identifying a sender-key message.
pub const WIRE_TYPE: u8 = 0x03;

/// Length of the fixed header: type, distribution id, index, nonce.
pub const WIRE_HEADER_SIZE: usize = 1 + DISTRIBUTION_ID_SIZE + 4 + NONCE_SIZE;

/// Minimum length of a whole message: header plus an empty ciphertext's
/// tag.
pub const MIN_WIRE_SIZE: usize = WIRE_HEADER_SIZE + 16;

const INDEX_OFFSET: usize = 1 + DISTRIBUTION_ID_SIZE;
const NONCE_OFFSET: usize = INDEX_OFFSET + 4;

/// Parsed header of a sender-key wire message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireHeader {
    /// Distribution this message belongs to
    pub distribution_id: [u8; DISTRIBUTION_ID_SIZE],
    /// Chain index the message was encrypted at
    pub chain_index: u32,
}

/// Parse and validate the fixed header of a wire message.
///
/// Lets a router bind a message to a distribution without decrypting.
///
/// # Errors
///
/// - `WireTruncated` if the buffer cannot hold a whole message
/// - `WrongType` if the type byte is not [`WIRE_TYPE`]
pub fn parse_wire_header(wire: &[u8]) -> Result<WireHeader, SenderKeyError> {
    if wire.len() < MIN_WIRE_SIZE {
        return Err(SenderKeyError::WireTruncated { expected: MIN_WIRE_SIZE, actual: wire.len() });
    }

    if wire[0] != WIRE_TYPE {
        return Err(SenderKeyError::WrongType { actual: wire[0] });
    }

    let mut distribution_id = [0u8; DISTRIBUTION_ID_SIZE];
    distribution_id.copy_from_slice(&wire[1..INDEX_OFFSET]);

    let mut index_bytes = [0u8; 4];
    index_bytes.copy_from_slice(&wire[INDEX_OFFSET..NONCE_OFFSET]);

    Ok(WireHeader { distribution_id, chain_index: u32::from_le_bytes(index_bytes) })
}

/// Encrypt one message, advancing the sender's chain.
///
/// The message key is derived from the chain key before the advance and
/// is not retained; after this call `state.chain_index()` has grown by
/// one and the old chain key is gone.
pub fn sender_key_encrypt(state: &mut SenderKeyState, plaintext: &[u8]) -> Vec<u8> {
    let index = state.chain_index();
    let message_key = state.advance();
    debug_assert_eq!(message_key.index(), index);

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = encryption::seal_message(plaintext, &message_key, &nonce);

    let mut wire = Vec::with_capacity(WIRE_HEADER_SIZE + ciphertext.len());
    wire.put_u8(WIRE_TYPE);
    wire.put_slice(state.distribution_id());
    wire.put_u32_le(index);
    wire.put_slice(&nonce);
    wire.put_slice(&ciphertext);
    wire
}

/// Decrypt one message, advancing the receiver's chain to just past the
/// message's index.
///
/// Intermediate message keys inside the skip window are derived and
/// discarded. On an authentication failure the chain stays advanced:
/// that index is permanently lost and the next valid message
/// re-synchronizes.
///
/// # Errors
///
/// - `WireTruncated` / `WrongType` for malformed framing
/// - `DistIdMismatch` if the message belongs to another distribution
/// - `AlreadyConsumed` if the message index is behind the chain
/// - `TooManySkipped` if the gap exceeds [`super::MAX_SKIP`]
/// - `DecryptFailed` if the secretbox rejects the ciphertext
pub fn sender_key_decrypt(
    wire: &[u8],
    received: &mut ReceivedSenderKey,
) -> Result<Vec<u8>, SenderKeyError> {
    let header = parse_wire_header(wire)?;

    if &header.distribution_id != received.distribution_id() {
        return Err(SenderKeyError::DistIdMismatch);
    }

    let message_key = received.advance_to(header.chain_index)?;

    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&wire[NONCE_OFFSET..WIRE_HEADER_SIZE]);

    encryption::open_message(&wire[WIRE_HEADER_SIZE..], &message_key, &nonce)
}
