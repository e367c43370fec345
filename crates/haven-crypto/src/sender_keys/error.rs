//! Error types for sender key operations.

use thiserror::Error;

/// Errors from sender key operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SenderKeyError {
    /// Distribution payload is shorter than the fixed 52-byte layout.
    #[error("distribution payload too short: got {actual} bytes, need 52")]
    SkdmTooShort {
        /// Length of the rejected payload
        actual: usize,
    },

    /// Sealed distribution message could not be opened. Deliberately
    /// opaque: wrong recipient and tampering are indistinguishable.
    #[error("could not open sealed distribution message")]
    SkdmDecryptFailed,

    /// Wire message does not start with the sender-key type byte.
    #[error("unexpected wire message type {actual:#04x}")]
    WrongType {
        /// Type byte found on the wire
        actual: u8,
    },

    /// Wire message belongs to a different sender key distribution.
    #[error("message belongs to a different sender key distribution")]
    DistIdMismatch,

    /// Wire message is shorter than the minimum frame.
    #[error("wire message truncated: got {actual} bytes, need at least {expected}")]
    WireTruncated {
        /// Minimum frame length
        expected: usize,
        /// Length of the rejected message
        actual: usize,
    },

    /// Message index is behind the receiver's chain. Receivers ratchet
    /// strictly forward; old indices are gone.
    #[error("message index {requested} already consumed: chain is at {current}")]
    AlreadyConsumed {
        /// Receiver's current chain index
        current: u32,
        /// Index requested by the message
        requested: u32,
    },

    /// Message index is further ahead than the skip window allows.
    #[error("too many skipped messages: chain at {current}, message at {requested}")]
    TooManySkipped {
        /// Receiver's current chain index
        current: u32,
        /// Index requested by the message
        requested: u32,
    },

    /// Authenticated decryption failed (tampering or wrong key).
    #[error("decryption failed: {reason}")]
    DecryptFailed {
        /// Reason for decryption failure
        reason: String,
    },

    /// Message from a member with no installed sender key.
    #[error("unknown sender: {member}")]
    UnknownSender {
        /// Member id that was not found
        member: String,
    },
}

impl SenderKeyError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Fatal errors indicate corruption or a protocol violation.
    /// Non-fatal errors may resolve once fresh key material arrives.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::SkdmTooShort { .. } => true,
            Self::SkdmDecryptFailed => true,
            Self::WrongType { .. } => true,
            Self::WireTruncated { .. } => true,
            Self::DecryptFailed { .. } => true,

            // Recoverable once the sender rotates or re-distributes
            Self::DistIdMismatch => false,
            Self::AlreadyConsumed { .. } => false,
            Self::TooManySkipped { .. } => false,
            Self::UnknownSender { .. } => false,
        }
    }
}
