//! Sender Keys: group messaging with per-sender symmetric ratchets.
//!
//! Each group member generates one sender key and distributes it to every
//! other member, sealed to that member's identity key. From then on the
//! sender encrypts each message under a fresh key derived from a forward
//! ratchet, and every holder of the distribution decrypts independently.
//!
//! # Architecture
//!
//! ```text
//! generate_sender_key
//!        │
//!        ▼ create_skdm_payload + encrypt_skdm (per recipient)
//! Sealed SKDM ──────────► open_distribution
//!        │                        │
//!        ▼                        ▼
//! SenderKeyState          ReceivedSenderKey
//!        │                        │
//!        ▼ sender_key_encrypt     ▼ sender_key_decrypt
//! Wire Message (0x03 ‖ dist_id ‖ index ‖ nonce ‖ ciphertext)
//! ```
//!
//! # Security Properties
//!
//! - Forward Secrecy: chain keys are overwritten on every ratchet step
//! - Key Uniqueness: each chain index yields a unique message key
//! - Authenticity: XSalsa20-Poly1305 rejects any tampered ciphertext
//!
//! Receivers ratchet strictly forward: a message older than the current
//! chain index is rejected, and catching up is capped at [`MAX_SKIP`]
//! steps.

pub mod encryption;
pub mod error;
pub mod ratchet;
pub mod skdm;
pub mod state;
pub mod store;
pub mod wire;

pub use error::SenderKeyError;
pub use ratchet::{MAX_SKIP, MessageKey};
pub use skdm::{SEALED_OVERHEAD, decrypt_skdm, encrypt_skdm, open_distribution};
pub use state::{
    CHAIN_KEY_SIZE, DISTRIBUTION_ID_SIZE, ReceivedSenderKey, SKDM_PAYLOAD_SIZE, SenderKeyState,
    create_skdm_payload, generate_sender_key, parse_skdm_payload,
};
pub use store::SenderKeyStore;
pub use wire::{
    MIN_WIRE_SIZE, WIRE_HEADER_SIZE, WIRE_TYPE, WireHeader, parse_wire_header, sender_key_decrypt,
    sender_key_encrypt,
};
