//! The export manifest: model, canonical form, signing.
//!
//! Signatures never cover the signature fields themselves: the manifest
//! is canonicalized with `user_signature` and `server_signature` removed
//! and with object keys sorted, then signed as UTF-8 JSON.

use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use ed25519_dalek::{Signature, VerifyingKey};
use haven_crypto::IdentityKeyPair;
use serde::{Deserialize, Serialize};

/// Current manifest schema version.
pub const MANIFEST_VERSION: u32 = 1;

/// Format marker carried by every manifest.
pub const MANIFEST_FORMAT: &str = "haven-export";

/// Path of the manifest inside the container.
pub const MANIFEST_PATH: &str = "manifest.json";

/// Hash and size of one packed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Lowercase hex SHA-256 of the file bytes
    pub sha256: String,
    /// File length in bytes
    pub size: u64,
}

/// Who produced the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedBy {
    /// Exporting user's id on the instance
    pub user_id: String,
    /// Display name at export time
    pub username: String,
    /// Standard-base64 Ed25519 public key; the key `user_signature` is
    /// verified against
    pub identity_key: String,
}

/// Inclusive ISO-8601 range of message timestamps in the export.
///
/// ISO-8601 strings compare correctly as plain strings, which is how the
/// builder folds ranges together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest message timestamp
    pub from: String,
    /// Latest message timestamp
    pub to: String,
}

/// What the export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    /// A whole server
    Server,
    /// A single channel
    Channel,
    /// A direct-message conversation
    Dm,
}

/// Manifest of one `.haven` archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HavenManifest {
    /// Schema version, currently [`MANIFEST_VERSION`]
    pub version: u32,
    /// Always [`MANIFEST_FORMAT`]
    pub format: String,
    /// Exporting user
    pub exported_by: ExportedBy,
    /// ISO-8601 UTC creation time
    pub exported_at: String,
    /// Export scope, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ExportScope>,
    /// Server the export came from, for server/channel scopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    /// Channel the export came from, for channel scope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Base URL of the originating instance
    pub instance_url: String,
    /// Every packed file except the manifest itself
    pub files: BTreeMap<String, FileEntry>,
    /// Total messages across all packed channels
    pub message_count: u64,
    /// Range of message timestamps across all packed channels
    pub date_range: DateRange,
    /// Exporter's detached signature over the canonical manifest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_signature: Option<String>,
    /// Instance's detached signature over the canonical manifest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_signature: Option<String>,
}

/// Canonical byte representation of a manifest for signing.
///
/// Both signature fields are removed and the JSON is emitted compact
/// with keys sorted lexicographically at every level, so signer and
/// verifier agree regardless of construction order.
pub fn canonical_manifest(manifest: &HavenManifest) -> Vec<u8> {
    let Ok(mut value) = serde_json::to_value(manifest) else {
        unreachable!("manifest serialization is infallible");
    };

    if let serde_json::Value::Object(map) = &mut value {
        map.remove("user_signature");
        map.remove("server_signature");
    }

    let Ok(bytes) = serde_json::to_vec(&value) else {
        unreachable!("manifest serialization is infallible");
    };
    bytes
}

/// Sign the canonical manifest, returning a standard-base64 signature.
pub fn sign_manifest(manifest: &HavenManifest, key: &IdentityKeyPair) -> String {
    STANDARD.encode(key.sign(&canonical_manifest(manifest)).to_bytes())
}

/// Verify a base64 signature over the canonical manifest.
///
/// Returns false on any decode or verification failure.
pub fn verify_manifest(manifest: &HavenManifest, signature: &str, key: &VerifyingKey) -> bool {
    let Ok(raw) = STANDARD.decode(signature) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(&raw) else {
        return false;
    };

    haven_crypto::verify_signature(key, &canonical_manifest(manifest), &signature).is_ok()
}
