//! Export archive builder.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use haven_crypto::IdentityKeyPair;
use tracing::debug;

use crate::{
    channel::{ChannelExport, slugify},
    container,
    error::{ExportError, Result},
    hash::compute_file_hash,
    manifest::{
        DateRange, ExportScope, ExportedBy, FileEntry, HavenManifest, MANIFEST_FORMAT,
        MANIFEST_PATH, MANIFEST_VERSION, sign_manifest,
    },
};

/// Export metadata fixed at construction time.
#[derive(Debug, Clone)]
pub struct ExportMeta {
    /// Exporting user's id
    pub user_id: String,
    /// Exporting user's display name
    pub username: String,
    /// Exporter's identity key, standard base64
    pub identity_key: String,
    /// Base URL of the originating instance
    pub instance_url: String,
    /// What the export covers, when known
    pub scope: Option<ExportScope>,
    /// Originating server id
    pub server_id: Option<String>,
    /// Originating channel id, for single-channel exports
    pub channel_id: Option<String>,
}

/// Accumulates export content and emits `.haven` archive bytes.
///
/// # Invariants
///
/// - `manifest.json` never appears among the accumulated blobs; it is
///   assembled last, after every file hash is known
/// - `message_count` and `date_range` always reflect exactly the
///   channels added so far
pub struct ExportBuilder {
    meta: ExportMeta,
    blobs: BTreeMap<String, Vec<u8>>,
    message_count: u64,
    date_from: Option<String>,
    date_to: Option<String>,
}

impl ExportBuilder {
    /// Start an empty export.
    pub fn new(meta: ExportMeta) -> Self {
        Self { meta, blobs: BTreeMap::new(), message_count: 0, date_from: None, date_to: None }
    }

    /// Add one conversation, serialized under `channels/<slug>.json` or
    /// `dms/<slug>.json`.
    ///
    /// The channel's counters fold into the manifest totals. When two
    /// names normalize to the same slug, a numeric suffix keeps both.
    /// Returns the path the channel was packed at.
    pub fn add_channel(&mut self, export: &ChannelExport) -> String {
        let Ok(bytes) = serde_json::to_vec_pretty(export) else {
            unreachable!("channel export serialization is infallible");
        };
        self.record_channel(export, bytes)
    }

    /// Add one conversation from raw JSON bytes, e.g. re-exported from
    /// another archive.
    ///
    /// The bytes are validated as a channel payload so the manifest
    /// counters stay honest, but they are packed exactly as supplied.
    /// Returns the path the channel was packed at.
    ///
    /// # Errors
    ///
    /// - `MalformedChannel` if the bytes do not parse as a channel
    ///   export; the builder is left untouched
    pub fn add_channel_json(&mut self, bytes: Vec<u8>) -> Result<String> {
        let export: ChannelExport = serde_json::from_slice(&bytes)
            .map_err(|source| ExportError::MalformedChannel { source })?;

        Ok(self.record_channel(&export, bytes))
    }

    fn record_channel(&mut self, export: &ChannelExport, bytes: Vec<u8>) -> String {
        let path = self.channel_path(export);

        self.message_count += export.message_count;
        self.fold_date(&export.date_range.from);
        self.fold_date(&export.date_range.to);

        debug!(path = %path, messages = export.message_count, "added channel export");
        self.blobs.insert(path.clone(), bytes);
        path
    }

    /// Add a binary attachment at `attachments/<id>.bin`.
    pub fn add_attachment(&mut self, id: &str, bytes: Vec<u8>) {
        let path = format!("attachments/{id}.bin");
        debug!(path = %path, size = bytes.len(), "added attachment");
        self.blobs.insert(path, bytes);
    }

    /// Set the server metadata blob at `server.json`, replacing any
    /// previous one.
    pub fn set_server_meta(&mut self, meta: &serde_json::Value) {
        let Ok(bytes) = serde_json::to_vec_pretty(meta) else {
            unreachable!("JSON value serialization is infallible");
        };
        self.blobs.insert("server.json".to_string(), bytes);
    }

    /// Set the audit log blob at `audit-log.json`, replacing any
    /// previous one.
    ///
    /// The bytes are packed exactly as supplied; the audit log is
    /// schema-free and the caller's JSON is preserved verbatim.
    pub fn set_audit_log(&mut self, bytes: Vec<u8>) {
        self.blobs.insert("audit-log.json".to_string(), bytes);
    }

    /// Total messages across the channels added so far.
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Assemble the manifest, optionally sign it, and pack the archive.
    ///
    /// Every accumulated blob is hashed into `manifest.files`; the
    /// manifest itself is never listed. With a signing key, the
    /// exporter's signature over the canonical manifest is attached
    /// before packing.
    pub fn build(self, signing_key: Option<&IdentityKeyPair>) -> Result<Vec<u8>> {
        let mut files = BTreeMap::new();
        for (path, bytes) in &self.blobs {
            files.insert(
                path.clone(),
                FileEntry { sha256: compute_file_hash(bytes), size: bytes.len() as u64 },
            );
        }

        let mut manifest = HavenManifest {
            version: MANIFEST_VERSION,
            format: MANIFEST_FORMAT.to_string(),
            exported_by: ExportedBy {
                user_id: self.meta.user_id,
                username: self.meta.username,
                identity_key: self.meta.identity_key,
            },
            exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            scope: self.meta.scope,
            server_id: self.meta.server_id,
            channel_id: self.meta.channel_id,
            instance_url: self.meta.instance_url,
            files,
            message_count: self.message_count,
            date_range: DateRange {
                from: self.date_from.unwrap_or_default(),
                to: self.date_to.unwrap_or_default(),
            },
            user_signature: None,
            server_signature: None,
        };

        if let Some(key) = signing_key {
            manifest.user_signature = Some(sign_manifest(&manifest, key));
        }

        let Ok(manifest_bytes) = serde_json::to_vec_pretty(&manifest) else {
            unreachable!("manifest serialization is infallible");
        };

        let mut entries = self.blobs;
        entries.insert(MANIFEST_PATH.to_string(), manifest_bytes);

        debug!(
            files = entries.len(),
            messages = self.message_count,
            signed = signing_key.is_some(),
            "packing export archive"
        );
        container::pack(&entries)
    }

    fn channel_path(&self, export: &ChannelExport) -> String {
        let directory = export.kind.directory();
        let slug = slugify(&export.name);

        let mut path = format!("{directory}/{slug}.json");
        let mut suffix = 2;
        while self.blobs.contains_key(&path) {
            path = format!("{directory}/{slug}_{suffix}.json");
            suffix += 1;
        }
        path
    }

    fn fold_date(&mut self, timestamp: &str) {
        if timestamp.is_empty() {
            return;
        }
        // ISO-8601 ordering coincides with string ordering
        match &self.date_from {
            Some(from) if from.as_str() <= timestamp => {}
            _ => self.date_from = Some(timestamp.to_string()),
        }
        match &self.date_to {
            Some(to) if to.as_str() >= timestamp => {}
            _ => self.date_to = Some(timestamp.to_string()),
        }
    }
}
