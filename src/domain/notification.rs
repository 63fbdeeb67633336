use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Id;

/// The kind of post a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    /// A note.
    Note,
    /// A discussion.
    Discussion,
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note => f.write_str("note"),
            Self::Discussion => f.write_str("discussion"),
        }
    }
}

/// A message telling an actor that someone replied to their post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique within the store.
    pub id: Id,
    /// The recipient.
    pub user_id: String,
    /// Human-readable summary.
    pub message: String,
    /// When the notification was raised.
    pub timestamp: DateTime<Utc>,
    /// Whether the recipient has seen it.
    #[serde(default)]
    pub is_read: bool,
    /// The post that was replied to.
    pub related_item_id: Id,
    /// Whether the related post is a note or a discussion.
    pub related_item_type: PostKind,
}

impl Notification {
    pub(crate) fn reply(recipient: String, replier: &str, post: Id, kind: PostKind) -> Self {
        Self {
            id: Id::generate(),
            user_id: recipient,
            message: format!("{replier} replied to your {kind}"),
            timestamp: Utc::now(),
            is_read: false,
            related_item_id: post,
            related_item_type: kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_message_names_the_post_kind() {
        let notification =
            Notification::reply("u1".to_string(), "Bea", Id::from("n1"), PostKind::Note);
        assert_eq!(notification.message, "Bea replied to your note");
        assert!(!notification.is_read);

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["relatedItemType"], "note");
        assert_eq!(json["userId"], "u1");
    }
}
