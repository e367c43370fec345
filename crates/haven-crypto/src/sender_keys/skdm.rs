//! Sealed envelopes for sender-key distribution messages.
//!
//! A distribution payload is sealed to each recipient's Ed25519 identity
//! key using anonymous sealed-box encryption: the identity key is mapped
//! to its X25519 equivalent, an ephemeral keypair performs the exchange,
//! and the ephemeral public key travels with the ciphertext. The sender
//! is not authenticated to the recipient at this layer.

use crypto_box::{PublicKey as BoxPublicKey, SecretKey as BoxSecretKey};
use ed25519_dalek::VerifyingKey;
use rand::rngs::OsRng;
use sha2::{Digest, Sha512};
use zeroize::Zeroize;

use crate::identity::IdentityKeyPair;

use super::{
    error::SenderKeyError,
    state::{ReceivedSenderKey, parse_skdm_payload},
};

/// Sealed-box overhead: 32-byte ephemeral public key plus 16-byte tag.
/// A 52-byte distribution payload seals to exactly 100 bytes.
pub const SEALED_OVERHEAD: usize = 48;

/// Seal a distribution payload to a recipient's identity key.
pub fn encrypt_skdm(payload: &[u8], recipient: &VerifyingKey) -> Vec<u8> {
    let recipient_key = box_public_key(recipient);

    let Ok(sealed) = recipient_key.seal(&mut OsRng, payload) else {
        unreachable!("sealed-box encryption cannot fail with valid inputs");
    };

    sealed
}

/// Open a sealed distribution payload with the recipient's identity
/// keypair.
///
/// # Errors
///
/// - `SkdmDecryptFailed` on wrong recipient or tampered bytes; the
///   failure carries no further information
pub fn decrypt_skdm(
    sealed: &[u8],
    recipient: &IdentityKeyPair,
) -> Result<Vec<u8>, SenderKeyError> {
    let secret = box_secret_key(recipient);
    secret.unseal(sealed).map_err(|_| SenderKeyError::SkdmDecryptFailed)
}

/// Open a sealed distribution message and install it as a receiver
/// state in one step.
///
/// # Errors
///
/// - `SkdmDecryptFailed` if the envelope does not open
/// - `SkdmTooShort` if the opened payload is malformed
pub fn open_distribution(
    sealed: &[u8],
    recipient: &IdentityKeyPair,
) -> Result<ReceivedSenderKey, SenderKeyError> {
    let mut payload = decrypt_skdm(sealed, recipient)?;
    let received = parse_skdm_payload(&payload);
    payload.zeroize();
    received
}

/// X25519 form of an Ed25519 public key via the Edwards→Montgomery map.
fn box_public_key(key: &VerifyingKey) -> BoxPublicKey {
    BoxPublicKey::from(key.to_montgomery().to_bytes())
}

/// X25519 form of an Ed25519 secret: the first 32 bytes of SHA-512 over
/// the seed, as libsodium's key conversion does.
fn box_secret_key(keypair: &IdentityKeyPair) -> BoxSecretKey {
    let digest = Sha512::digest(keypair.secret_bytes());
    let mut scalar = [0u8; 32];
    scalar.copy_from_slice(&digest[..32]);

    let secret = BoxSecretKey::from(scalar);
    scalar.zeroize();
    secret
}
