//! Ed25519 identity keypair.
//!
//! The identity key is the long-lived root of trust for a Haven user. It
//! signs export manifests and receives sealed sender-key distribution
//! messages. Private keys are never serialized by this crate; callers own
//! storage.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

/// Errors from identity key handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Public key bytes do not decode to a valid Ed25519 point.
    #[error("invalid public key bytes")]
    InvalidKeyBytes,

    /// Signature does not verify against the given key and message.
    #[error("invalid signature")]
    InvalidSignature,
}

/// Ed25519 signing keypair identifying one Haven user.
#[derive(Clone)]
pub struct IdentityKeyPair {
    signing_key: SigningKey,
}

impl IdentityKeyPair {
    /// Generate a fresh keypair from the system CSPRNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Restore a keypair from its 32-byte secret seed.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(secret);
        Self { signing_key }
    }

    /// The public half of this keypair.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Public key as raw bytes.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Public key as standard base64 (with padding), the encoding used in
    /// export manifests.
    pub fn public_key_base64(&self) -> String {
        STANDARD.encode(self.public_key_bytes())
    }

    /// The 32-byte secret seed. Callers are responsible for storing this
    /// safely; it never leaves the process through this crate.
    pub fn secret_bytes(&self) -> &[u8; 32] {
        self.signing_key.as_bytes()
    }

    /// Sign a message with this identity.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

/// Verify an Ed25519 signature.
pub fn verify_signature(
    public_key: &VerifyingKey,
    message: &[u8],
    signature: &Signature,
) -> Result<(), IdentityError> {
    public_key.verify(message, signature).map_err(|_| IdentityError::InvalidSignature)
}

/// Decode a standard-base64 public key as found in export manifests.
pub fn parse_public_key_base64(encoded: &str) -> Result<VerifyingKey, IdentityError> {
    let raw = STANDARD.decode(encoded).map_err(|_| IdentityError::InvalidKeyBytes)?;
    let bytes: [u8; 32] = raw.try_into().map_err(|_| IdentityError::InvalidKeyBytes)?;
    VerifyingKey::from_bytes(&bytes).map_err(|_| IdentityError::InvalidKeyBytes)
}
