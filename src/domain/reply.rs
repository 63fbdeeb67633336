use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Attachment, Id, Vote};

/// A comment attached to a note or a discussion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Unique within the parent's replies.
    pub id: Id,
    /// Store-wide insertion counter.
    #[serde(default)]
    pub seq: u64,
    /// Body text.
    pub content: String,
    /// Display name of the author.
    pub author: String,
    /// Identifier of the author.
    pub author_id: String,
    /// When the reply was created.
    pub timestamp: DateTime<Utc>,
    /// Number of likes.
    #[serde(default)]
    pub likes: u32,
    /// Number of dislikes.
    #[serde(default)]
    pub dislikes: u32,
    /// Files and links staged with the reply.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Reply {
    pub(crate) fn create(new: NewReply, seq: u64) -> Self {
        Self {
            id: Id::generate(),
            seq,
            content: new.content,
            author: new.author,
            author_id: new.author_id,
            timestamp: Utc::now(),
            likes: 0,
            dislikes: 0,
            attachments: new.attachments,
        }
    }

    pub(crate) fn vote(&mut self, vote: Vote) {
        vote.apply(&mut self.likes, &mut self.dislikes);
    }

    pub(crate) fn apply(&mut self, patch: ReplyPatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
    }
}

/// The caller-supplied fields of a new reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewReply {
    /// Body text.
    pub content: String,
    /// Display name of the author.
    pub author: String,
    /// Identifier of the author.
    pub author_id: String,
    /// Staged attachments.
    pub attachments: Vec<Attachment>,
}

/// Fields of a reply that may be overwritten after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyPatch {
    /// Replacement body text.
    pub content: Option<String>,
}
