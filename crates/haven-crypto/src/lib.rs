//! Haven Cryptographic Primitives
//!
//! Cryptographic building blocks for Haven's group messaging: an Ed25519
//! identity keypair and the sender-key protocol that lets one member
//! encrypt a message once while every group member decrypts it
//! independently.
//!
//! # Key Lifecycle
//!
//! Each group member generates a sender key (a random 16-byte distribution
//! id plus a 32-byte chain key) and distributes it to every other member
//! inside a sealed-box envelope addressed to that member's identity key.
//! A symmetric ratchet then derives one message key per outgoing message,
//! providing forward secrecy within a distribution.
//!
//! ```text
//! Sender Key (random, per member)
//!        │
//!        ▼ sealed box per recipient
//! Distribution Message (SKDM)
//!        │
//!        ▼ install
//! Chain Ratchet → Message Keys
//!        │
//!        ▼
//! XSalsa20-Poly1305 → Wire Message
//! ```
//!
//! Message keys are used for exactly one encryption operation and are
//! discarded immediately after use. Old chain keys are overwritten when
//! the ratchet advances, so compromise of the current state does not
//! reveal past messages.
//!
//! # Security
//!
//! Forward Secrecy:
//! - Ratchet advancement: old chain keys are zeroized after deriving the
//!   next key
//! - Message key disposal: keys are zeroized after single use
//!
//! Sender Isolation:
//! - Each member generates an independent sender key; compromising one
//!   member's chain does not expose other members' messages
//!
//! Authenticity:
//! - XSalsa20-Poly1305 provides tamper-proof encryption; a failed
//!   authentication tag rejects the message
//! - Distribution envelopes are bound to the recipient's identity key via
//!   anonymous sealed-box encryption
//!
//! There is no post-compromise security within a distribution: recovering
//! from compromise requires rotating the sender key and re-distributing.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod identity;
pub mod sender_keys;

pub use identity::{IdentityError, IdentityKeyPair, parse_public_key_base64, verify_signature};
pub use sender_keys::{
    MAX_SKIP, MIN_WIRE_SIZE, MessageKey, ReceivedSenderKey, SEALED_OVERHEAD, SKDM_PAYLOAD_SIZE,
    SenderKeyError, SenderKeyState, SenderKeyStore, WIRE_HEADER_SIZE, WIRE_TYPE, WireHeader,
    create_skdm_payload, decrypt_skdm, encrypt_skdm, generate_sender_key, open_distribution,
    parse_skdm_payload, parse_wire_header, sender_key_decrypt, sender_key_encrypt,
};
