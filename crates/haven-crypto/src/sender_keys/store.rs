//! Sender key store for one group.
//!
//! Owns the local member's sender state, its self-decrypt clone, and one
//! receiver per remote member. Installed keys are overwritten when a
//! member rotates.

use std::collections::HashMap;

use ed25519_dalek::VerifyingKey;

use crate::identity::IdentityKeyPair;

use super::{
    error::SenderKeyError,
    skdm,
    state::{
        DISTRIBUTION_ID_SIZE, ReceivedSenderKey, SKDM_PAYLOAD_SIZE, SenderKeyState,
        create_skdm_payload, generate_sender_key,
    },
    wire,
};

/// Per-group sender key state for one member.
///
/// # Invariants
///
/// - Exactly one mutable sender state; encrypts are strictly ordered
/// - The self-decrypt clone is taken at chain index 0 and never written
///   to by encryption
/// - Receiver chains only move forward
pub struct SenderKeyStore {
    own: SenderKeyState,
    own_receiver: ReceivedSenderKey,
    peers: HashMap<String, ReceivedSenderKey>,
}

impl Default for SenderKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SenderKeyStore {
    /// Create a store with a freshly generated sender key.
    ///
    /// The self-decrypt clone is taken immediately, while the chain index
    /// is still 0, so the local member can read back its own messages.
    pub fn new() -> Self {
        let own = generate_sender_key();
        let own_receiver = own.to_receiver();
        Self { own, own_receiver, peers: HashMap::new() }
    }

    /// Replace the local sender key with a fresh one.
    ///
    /// Called on membership change or scheduled rotation. Previously
    /// distributed keys keep decrypting old messages on the receiver
    /// side; new messages require re-distribution.
    pub fn rotate(&mut self) {
        self.own = generate_sender_key();
        self.own_receiver = self.own.to_receiver();
    }

    /// Distribution id of the local sender key.
    pub fn distribution_id(&self) -> &[u8; DISTRIBUTION_ID_SIZE] {
        self.own.distribution_id()
    }

    /// Number of messages encrypted under the current sender key.
    pub fn chain_index(&self) -> u32 {
        self.own.chain_index()
    }

    /// Snapshot of the local sender key as a distribution payload.
    ///
    /// Taken at the current chain index: a member joining late cannot
    /// read messages sent before the snapshot.
    pub fn distribution_payload(&self) -> [u8; SKDM_PAYLOAD_SIZE] {
        create_skdm_payload(&self.own)
    }

    /// Seal the current distribution payload to one member's identity
    /// key.
    pub fn seal_distribution_for(&self, recipient: &VerifyingKey) -> Vec<u8> {
        skdm::encrypt_skdm(&self.distribution_payload(), recipient)
    }

    /// Install a member's receiver state, replacing any previous one.
    pub fn install(&mut self, member: impl Into<String>, received: ReceivedSenderKey) {
        self.peers.insert(member.into(), received);
    }

    /// Open a sealed distribution message from a member and install it.
    ///
    /// # Errors
    ///
    /// - `SkdmDecryptFailed` / `SkdmTooShort` if the envelope or payload
    ///   is bad; the previous state for that member is kept
    pub fn install_sealed(
        &mut self,
        member: impl Into<String>,
        sealed: &[u8],
        identity: &IdentityKeyPair,
    ) -> Result<(), SenderKeyError> {
        let received = skdm::open_distribution(sealed, identity)?;
        self.peers.insert(member.into(), received);
        Ok(())
    }

    /// Whether a member has an installed sender key.
    pub fn has_member(&self, member: &str) -> bool {
        self.peers.contains_key(member)
    }

    /// Number of remote members with installed keys.
    pub fn member_count(&self) -> usize {
        self.peers.len()
    }

    /// Next chain index expected from a member. `None` if the member has
    /// no installed key.
    pub fn member_chain_index(&self, member: &str) -> Option<u32> {
        self.peers.get(member).map(ReceivedSenderKey::chain_index)
    }

    /// Encrypt a message under the local sender key.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Vec<u8> {
        wire::sender_key_encrypt(&mut self.own, plaintext)
    }

    /// Decrypt a message from a remote member.
    ///
    /// # Errors
    ///
    /// - `UnknownSender` if the member has no installed key
    /// - any [`wire::sender_key_decrypt`] error
    pub fn decrypt_from(
        &mut self,
        member: &str,
        message: &[u8],
    ) -> Result<Vec<u8>, SenderKeyError> {
        let received = self
            .peers
            .get_mut(member)
            .ok_or_else(|| SenderKeyError::UnknownSender { member: member.to_string() })?;

        wire::sender_key_decrypt(message, received)
    }

    /// Decrypt one of the local member's own messages via the
    /// self-decrypt clone.
    pub fn decrypt_own(&mut self, message: &[u8]) -> Result<Vec<u8>, SenderKeyError> {
        wire::sender_key_decrypt(message, &mut self.own_receiver)
    }
}
