use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ChannelId);
id_newtype!(MessageId);

/// Identity presented to the backend when connecting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Regular,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub mime_type: Option<String>,
    pub url: Option<String>,
    pub size_bytes: u64,
    pub title: Option<String>,
}

/// A message as received from the backend. Immutable once ingested;
/// presentation derives copies and never writes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub kind: MessageKind,
    pub sender_id: UserId,
    pub attachments: Vec<Attachment>,
}

/// A conversation context with membership, as summarized by the backend
/// channel query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: ChannelId,
    pub name: Option<String>,
    pub member_ids: Vec<UserId>,
    pub member_names: HashMap<UserId, String>,
    pub last_updated: DateTime<Utc>,
}

impl ChannelRef {
    /// Display name: the explicit channel name if set, otherwise the
    /// names of the members other than `current_user` (falling back to
    /// their ids), otherwise "Chat".
    pub fn display_name(&self, current_user: &UserId) -> String {
        if let Some(name) = &self.name {
            if !name.is_empty() {
                return name.clone();
            }
        }

        let others: Vec<&str> = self
            .member_ids
            .iter()
            .filter(|id| *id != current_user)
            .map(|id| {
                self.member_names
                    .get(id)
                    .map(String::as_str)
                    .unwrap_or(id.as_str())
            })
            .collect();

        if others.is_empty() {
            "Chat".to_string()
        } else {
            others.join(", ")
        }
    }
}

/// A reply sub-context anchored to one parent message. Scoped to a
/// channel logically, but carries no channel id; the store tracks the
/// pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRef {
    pub parent_message_id: MessageId,
    pub active: bool,
}

/// Canned composer texts keyed by a symbolic id. Static, not
/// user-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    Greeting,
    Thanks,
    Schedule,
}

impl TemplateId {
    pub fn canonical_text(self) -> &'static str {
        match self {
            TemplateId::Greeting => "Hello! How can I help you today?",
            TemplateId::Thanks => "Thank you for reaching out. I appreciate it!",
            TemplateId::Schedule => "Would you like to schedule a call to discuss this further?",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "greeting" => Some(TemplateId::Greeting),
            "thanks" => Some(TemplateId::Thanks),
            "schedule" => Some(TemplateId::Schedule),
            _ => None,
        }
    }
}
