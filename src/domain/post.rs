//! Notes and discussions: the two kinds of top-level post in a forum.

use std::{cmp::Reverse, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Attachment, Id, PollOption, Reply, ValidationError};

/// A like or a dislike.
///
/// Counters only ever go up; there is no per-actor de-duplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vote {
    /// Increments `likes`.
    Like,
    /// Increments `dislikes`.
    Dislike,
}

impl Vote {
    pub(crate) fn apply(self, likes: &mut u32, dislikes: &mut u32) {
        let counter = match self {
            Self::Like => likes,
            Self::Dislike => dislikes,
        };
        *counter = counter.saturating_add(1);
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Like => f.write_str("like"),
            Self::Dislike => f.write_str("dislike"),
        }
    }
}

impl FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            other => Err(format!("unknown vote '{other}', expected 'like' or 'dislike'")),
        }
    }
}

/// A long-form, single-author post within a forum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique within the forum's notes.
    pub id: Id,
    /// Store-wide insertion counter.
    #[serde(default)]
    pub seq: u64,
    /// Heading.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Display name of the author.
    pub author: String,
    /// Identifier of the author.
    pub author_id: String,
    /// When the note was created.
    pub timestamp: DateTime<Utc>,
    /// Comments, oldest first.
    #[serde(default)]
    pub replies: Vec<Reply>,
    /// Number of likes.
    #[serde(default)]
    pub likes: u32,
    /// Number of dislikes.
    #[serde(default)]
    pub dislikes: u32,
    /// Files and links staged with the note.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Pinned notes sort before all others.
    #[serde(default)]
    pub is_pinned: bool,
}

impl Note {
    pub(crate) fn create(new: NewNote, seq: u64) -> Self {
        Self {
            id: Id::generate(),
            seq,
            title: new.title,
            content: new.content,
            author: new.author,
            author_id: new.author_id,
            timestamp: Utc::now(),
            replies: Vec::new(),
            likes: 0,
            dislikes: 0,
            attachments: new.attachments,
            is_pinned: false,
        }
    }

    pub(crate) fn vote(&mut self, vote: Vote) {
        vote.apply(&mut self.likes, &mut self.dislikes);
    }

    pub(crate) fn apply(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(pinned) = patch.is_pinned {
            self.is_pinned = pinned;
        }
    }
}

/// A short, reply-oriented post within a forum, optionally a poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    /// Unique within the forum's discussions.
    pub id: Id,
    /// Store-wide insertion counter.
    #[serde(default)]
    pub seq: u64,
    /// Body text, or the question when this is a poll.
    pub content: String,
    /// Display name of the author.
    pub author: String,
    /// Identifier of the author.
    pub author_id: String,
    /// When the discussion was started.
    pub timestamp: DateTime<Utc>,
    /// Comments, oldest first.
    #[serde(default)]
    pub replies: Vec<Reply>,
    /// Number of likes.
    #[serde(default)]
    pub likes: u32,
    /// Number of dislikes.
    #[serde(default)]
    pub dislikes: u32,
    /// Files and links staged with the discussion.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Pinned discussions sort before all others.
    #[serde(default)]
    pub is_pinned: bool,
    /// Whether this discussion is a poll.
    #[serde(default)]
    pub is_poll: bool,
    /// The poll's choices, when this is a poll.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_options: Option<Vec<PollOption>>,
}

impl Discussion {
    pub(crate) fn create(new: NewDiscussion, seq: u64) -> Self {
        let poll_options = new
            .poll_options
            .map(|options| options.into_iter().map(PollOption::new).collect());

        Self {
            id: Id::generate(),
            seq,
            content: new.content,
            author: new.author,
            author_id: new.author_id,
            timestamp: Utc::now(),
            replies: Vec::new(),
            likes: 0,
            dislikes: 0,
            attachments: new.attachments,
            is_pinned: false,
            is_poll: poll_options.is_some(),
            poll_options,
        }
    }

    /// The poll's choices, if this discussion is a poll.
    #[must_use]
    pub fn poll(&self) -> Option<&[PollOption]> {
        if self.is_poll {
            self.poll_options.as_deref()
        } else {
            None
        }
    }

    pub(crate) fn poll_mut(&mut self) -> Option<&mut [PollOption]> {
        if self.is_poll {
            self.poll_options.as_deref_mut()
        } else {
            None
        }
    }

    /// Sum of votes across all poll options. Zero when this is not a poll.
    #[must_use]
    pub fn total_votes(&self) -> u32 {
        self.poll().map_or(0, |options| {
            options.iter().map(|o| o.votes).fold(0, u32::saturating_add)
        })
    }

    /// The option the actor currently holds, if any.
    #[must_use]
    pub fn voted_option(&self, actor: &str) -> Option<&PollOption> {
        self.poll()?.iter().find(|o| o.has_voter(actor))
    }

    pub(crate) fn vote(&mut self, vote: Vote) {
        vote.apply(&mut self.likes, &mut self.dislikes);
    }

    pub(crate) fn apply(&mut self, patch: DiscussionPatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(pinned) = patch.is_pinned {
            self.is_pinned = pinned;
        }
    }
}

/// The caller-supplied fields of a new note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNote {
    /// Heading.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Display name of the author.
    pub author: String,
    /// Identifier of the author.
    pub author_id: String,
    /// Staged attachments.
    pub attachments: Vec<Attachment>,
}

/// The caller-supplied fields of a new discussion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDiscussion {
    /// Body text, or the poll question.
    pub content: String,
    /// Display name of the author.
    pub author: String,
    /// Identifier of the author.
    pub author_id: String,
    /// Staged attachments.
    pub attachments: Vec<Attachment>,
    /// Choice texts, when the discussion is a poll.
    pub poll_options: Option<Vec<String>>,
}

impl NewDiscussion {
    /// Minimum number of non-blank choices in a poll.
    pub const MIN_POLL_OPTIONS: usize = 2;

    /// Builds a poll discussion.
    ///
    /// Blank choices are dropped; the remaining choices are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TooFewPollOptions`] if fewer than two
    /// non-blank choices remain, or [`ValidationError::Empty`] if the
    /// question is blank.
    pub fn poll(
        question: String,
        options: impl IntoIterator<Item = String>,
        author: String,
        author_id: String,
    ) -> Result<Self, ValidationError> {
        if question.trim().is_empty() {
            return Err(ValidationError::Empty("poll question"));
        }

        let options: Vec<String> = options
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if options.len() < Self::MIN_POLL_OPTIONS {
            return Err(ValidationError::TooFewPollOptions(options.len()));
        }

        Ok(Self {
            content: question,
            author,
            author_id,
            attachments: Vec::new(),
            poll_options: Some(options),
        })
    }
}

/// Fields of a note that may be overwritten after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    /// Replacement heading.
    pub title: Option<String>,
    /// Replacement body text.
    pub content: Option<String>,
    /// New pin state.
    pub is_pinned: Option<bool>,
}

/// Fields of a discussion that may be overwritten after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscussionPatch {
    /// Replacement body text.
    pub content: Option<String>,
    /// New pin state.
    pub is_pinned: Option<bool>,
}

/// Something with a display priority: pin state first, then recency.
pub(crate) trait Ranked {
    fn is_pinned(&self) -> bool;
    fn seq(&self) -> u64;
}

impl Ranked for Note {
    fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    fn seq(&self) -> u64 {
        self.seq
    }
}

impl Ranked for Discussion {
    fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    fn seq(&self) -> u64 {
        self.seq
    }
}

/// Orders posts pinned-first, then newest-first by insertion sequence.
pub(crate) fn by_priority<T: Ranked>(items: &[T]) -> Vec<&T> {
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by_key(|item| (Reverse(item.is_pinned()), Reverse(item.seq())));
    ranked
}
