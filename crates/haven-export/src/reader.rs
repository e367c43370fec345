//! Export archive reader and integrity verification.

use tracing::{debug, warn};

use std::collections::BTreeMap;

use crate::{
    channel::{ChannelExport, slugify},
    container,
    error::{ExportError, Result},
    hash::compute_file_hash,
    manifest::{HavenManifest, MANIFEST_PATH, verify_manifest},
};

/// Outcome of [`ExportReader::verify`].
///
/// Verification never refuses to open an archive; every discrepancy is
/// one human-readable issue string, and `valid` holds exactly when there
/// are none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// True iff no issues were found
    pub valid: bool,
    /// One entry per integrity problem
    pub issues: Vec<String>,
}

/// An opened `.haven` archive.
pub struct ExportReader {
    entries: BTreeMap<String, Vec<u8>>,
    manifest: HavenManifest,
}

impl ExportReader {
    /// Open archive bytes: unpack the container and parse the manifest.
    ///
    /// # Errors
    ///
    /// - `Container` if the bytes are not a readable ZIP
    /// - `MissingManifest` if there is no `manifest.json`
    /// - `MalformedManifest` if it does not parse
    pub fn from_blob(bytes: &[u8]) -> Result<Self> {
        let entries = container::unpack(bytes)?;

        let manifest_bytes = entries.get(MANIFEST_PATH).ok_or(ExportError::MissingManifest)?;
        let manifest: HavenManifest = serde_json::from_slice(manifest_bytes)
            .map_err(|source| ExportError::MalformedManifest { source })?;

        debug!(files = entries.len(), messages = manifest.message_count, "opened export archive");
        Ok(Self { entries, manifest })
    }

    /// The parsed manifest.
    pub fn manifest(&self) -> &HavenManifest {
        &self.manifest
    }

    /// Mutable access to the manifest, e.g. to attach a server signature
    /// before re-packing.
    pub fn manifest_mut(&mut self) -> &mut HavenManifest {
        &mut self.manifest
    }

    /// Look up one conversation by name, first under `channels/`, then
    /// under `dms/`. Returns `None` when absent or malformed.
    pub fn channel_export(&self, name: &str) -> Option<ChannelExport> {
        let slug = slugify(name);
        ["channels", "dms"].iter().find_map(|directory| {
            let bytes = self.entries.get(&format!("{directory}/{slug}.json"))?;
            serde_json::from_slice(bytes).ok()
        })
    }

    /// Every parseable conversation in the archive. Malformed entries
    /// are skipped with a warning.
    pub fn channel_exports(&self) -> Vec<ChannelExport> {
        self.entries
            .iter()
            .filter(|(path, _)| {
                (path.starts_with("channels/") || path.starts_with("dms/"))
                    && path.ends_with(".json")
            })
            .filter_map(|(path, bytes)| match serde_json::from_slice(bytes) {
                Ok(export) => Some(export),
                Err(err) => {
                    warn!(path = %path, error = %err, "skipping malformed channel export");
                    None
                }
            })
            .collect()
    }

    /// The `server.json` blob, parsed. `None` when absent or malformed.
    pub fn server_meta(&self) -> Option<serde_json::Value> {
        let bytes = self.entries.get("server.json")?;
        serde_json::from_slice(bytes).ok()
    }

    /// The `audit-log.json` blob, parsed. `None` when absent or
    /// malformed.
    pub fn audit_log(&self) -> Option<serde_json::Value> {
        let bytes = self.entries.get("audit-log.json")?;
        serde_json::from_slice(bytes).ok()
    }

    /// Raw bytes of an archive entry by full path, e.g.
    /// `attachments/att-001.bin`.
    pub fn attachment(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// Check every manifest hash and the user signature.
    ///
    /// For each `manifest.files` entry the blob must exist and match its
    /// recorded hash and size. If `user_signature` is present it must
    /// verify against `exported_by.identity_key` over the canonical
    /// manifest.
    pub fn verify(&self) -> VerificationReport {
        let mut issues = Vec::new();

        for (path, entry) in &self.manifest.files {
            match self.entries.get(path) {
                None => issues.push(format!("Missing file: {path}")),
                Some(bytes) => {
                    let actual = compute_file_hash(bytes);
                    if actual != entry.sha256 {
                        issues.push(format!(
                            "Hash mismatch for {path}: expected {}, got {actual}",
                            entry.sha256
                        ));
                    }
                    if bytes.len() as u64 != entry.size {
                        issues.push(format!(
                            "Size mismatch for {path}: expected {}, got {}",
                            entry.size,
                            bytes.len()
                        ));
                    }
                }
            }
        }

        if let Some(signature) = &self.manifest.user_signature {
            let verified = haven_crypto::parse_public_key_base64(
                &self.manifest.exported_by.identity_key,
            )
            .map(|key| verify_manifest(&self.manifest, signature, &key))
            .unwrap_or(false);

            if !verified {
                issues.push("User signature verification failed".to_string());
            }
        }

        if !issues.is_empty() {
            warn!(issues = issues.len(), "export archive failed verification");
        }

        VerificationReport { valid: issues.is_empty(), issues }
    }
}
