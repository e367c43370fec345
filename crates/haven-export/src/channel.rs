//! Channel export payloads and path slugs.

use serde::{Deserialize, Serialize};

use crate::manifest::DateRange;

/// Whether a conversation is a server channel or a direct message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Server channel, packed under `channels/`
    #[default]
    Channel,
    /// Direct-message conversation, packed under `dms/`
    Dm,
}

impl ChannelKind {
    pub(crate) fn directory(self) -> &'static str {
        match self {
            Self::Channel => "channels",
            Self::Dm => "dms",
        }
    }
}

/// One conversation's export: identity, counters and the message log.
///
/// The message log is schema-free JSON; the archive core never inspects
/// individual messages, only the counters the builder folds into the
/// manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelExport {
    /// Channel id on the originating instance
    pub channel_id: String,
    /// Human-readable channel name, slugged into the archive path
    pub name: String,
    /// Channel or DM
    #[serde(default)]
    pub kind: ChannelKind,
    /// Number of messages in `messages`
    pub message_count: u64,
    /// Timestamp range covered by `messages`
    pub date_range: DateRange,
    /// The messages themselves, untouched
    #[serde(default)]
    pub messages: serde_json::Value,
}

/// Archive-safe form of a channel name: every character outside
/// `[A-Za-z0-9_-]` becomes `_`.
pub(crate) fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(slugify("general"), "general");
        assert_eq!(slugify("dev-team_2"), "dev-team_2");
    }

    #[test]
    fn unsafe_characters_become_underscores() {
        assert_eq!(slugify("Announcements & News"), "Announcements___News");
        assert_eq!(slugify("../escape"), "___escape");
        assert_eq!(slugify("caf\u{e9}"), "caf_");
    }

    #[test]
    fn kind_defaults_to_channel() {
        let export: ChannelExport = serde_json::from_str(
            r#"{
                "channel_id": "c-1",
                "name": "general",
                "message_count": 0,
                "date_range": {"from": "", "to": ""}
            }"#,
        )
        .unwrap();

        assert_eq!(export.kind, ChannelKind::Channel);
        assert!(export.messages.is_null());
    }
}
