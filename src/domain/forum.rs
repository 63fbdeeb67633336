use serde::{Deserialize, Serialize};

use crate::domain::{Discussion, Id, NewDiscussion, Note, Rating, post::by_priority};

/// A named community space containing notes and discussions.
///
/// This is the aggregate root of the store: every other entity lives inside
/// exactly one forum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forum {
    /// Unique within the store.
    pub id: Id,
    /// Display name.
    pub name: String,
    /// What the forum is about.
    pub description: String,
    /// Free-text labels, in the order they were given.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Running star rating.
    #[serde(default)]
    pub rating: Rating,
    /// Notes in insertion order.
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Discussions, newest first.
    #[serde(default)]
    pub discussions: Vec<Discussion>,
}

impl Forum {
    pub(crate) fn create(new: NewForum) -> Self {
        Self {
            id: Id::generate(),
            name: new.name,
            description: new.description,
            tags: new.tags,
            rating: Rating::default(),
            notes: Vec::new(),
            discussions: Vec::new(),
        }
    }

    /// Looks up a note by id.
    #[must_use]
    pub fn note(&self, id: &Id) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    /// Looks up a discussion by id.
    #[must_use]
    pub fn discussion(&self, id: &Id) -> Option<&Discussion> {
        self.discussions.iter().find(|d| &d.id == id)
    }

    pub(crate) fn note_mut(&mut self, id: &Id) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| &n.id == id)
    }

    pub(crate) fn discussion_mut(&mut self, id: &Id) -> Option<&mut Discussion> {
        self.discussions.iter_mut().find(|d| &d.id == id)
    }

    /// Notes in display order: pinned first, then newest first.
    #[must_use]
    pub fn notes_by_priority(&self) -> Vec<&Note> {
        by_priority(&self.notes)
    }

    /// Discussions in display order: pinned first, then newest first.
    #[must_use]
    pub fn discussions_by_priority(&self) -> Vec<&Discussion> {
        by_priority(&self.discussions)
    }

    /// Highest sequence number used anywhere in the forum.
    pub(crate) fn max_seq(&self) -> u64 {
        let notes = self
            .notes
            .iter()
            .flat_map(|n| std::iter::once(n.seq).chain(n.replies.iter().map(|r| r.seq)));
        let discussions = self
            .discussions
            .iter()
            .flat_map(|d| std::iter::once(d.seq).chain(d.replies.iter().map(|r| r.seq)));
        notes.chain(discussions).max().unwrap_or(0)
    }

    pub(crate) fn apply(&mut self, patch: ForumPatch) {
        let ForumPatch {
            name,
            description,
            tags,
            rating,
            notes,
            discussions,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(tags) = tags {
            self.tags = tags;
        }
        if let Some(rating) = rating {
            self.rating = rating;
        }
        if let Some(notes) = notes {
            self.notes = notes;
        }
        if let Some(discussions) = discussions {
            self.discussions = discussions;
        }
    }
}

/// The caller-supplied fields of a new forum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewForum {
    /// Display name.
    pub name: String,
    /// What the forum is about.
    pub description: String,
    /// Free-text labels.
    pub tags: Vec<String>,
}

impl NewForum {
    /// Checks the fields a forum needs before it is created.
    ///
    /// The store accepts any [`NewForum`]; callers that collect user input
    /// should run this first.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Empty`] if the name or description is blank,
    /// or [`ValidationError::NoTags`] if no non-blank tag was given.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty("name"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::Empty("description"));
        }
        if self.tags.iter().all(|t| t.trim().is_empty()) {
            return Err(ValidationError::NoTags);
        }
        Ok(())
    }
}

/// A shallow update of a forum's fields.
///
/// Fields left as `None` are not touched. Replacing `notes` or `discussions`
/// swaps the whole collection; prefer the path-addressed store operations
/// for changes to a single post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForumPatch {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement tags.
    pub tags: Option<Vec<String>>,
    /// Replacement rating.
    pub rating: Option<Rating>,
    /// Replacement notes.
    pub notes: Option<Vec<Note>>,
    /// Replacement discussions.
    pub discussions: Option<Vec<Discussion>>,
}

/// Input rejected before it reaches the store.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was blank.
    #[error("{0} must not be empty")]
    Empty(&'static str),
    /// A forum needs at least one tag.
    #[error("at least one tag is required")]
    NoTags,
    /// A poll needs at least two choices.
    #[error("a poll needs at least {min} options, got {0}", min = NewDiscussion::MIN_POLL_OPTIONS)]
    TooFewPollOptions(usize),
}
