//! Signed `.haven` export archives.
//!
//! A `.haven` file is a ZIP container packaging channel history, server
//! metadata and binary attachments together with a `manifest.json` that
//! carries a SHA-256 hash and size for every packed file. The manifest
//! can be signed with the exporter's Ed25519 identity key; signatures are
//! computed over a canonical byte representation with the signature
//! fields removed.
//!
//! Layout inside the container:
//!
//! ```text
//! manifest.json            required
//! channels/<slug>.json     zero or more
//! dms/<slug>.json          zero or more
//! server.json              optional
//! audit-log.json           optional
//! attachments/<id>.bin     zero or more
//! ```
//!
//! [`ExportBuilder`] accumulates content and emits archive bytes;
//! [`ExportReader`] opens them, exposes typed accessors and verifies
//! integrity without refusing to open damaged archives.

#![forbid(unsafe_code)]

mod builder;
mod channel;
mod container;
mod error;
mod hash;
mod manifest;
mod reader;

pub use builder::{ExportBuilder, ExportMeta};
pub use channel::{ChannelExport, ChannelKind};
pub use error::{ExportError, Result};
pub use hash::compute_file_hash;
pub use manifest::{
    DateRange, ExportScope, ExportedBy, FileEntry, HavenManifest, MANIFEST_FORMAT, MANIFEST_PATH,
    MANIFEST_VERSION, canonical_manifest, sign_manifest, verify_manifest,
};
pub use reader::{ExportReader, VerificationReport};
