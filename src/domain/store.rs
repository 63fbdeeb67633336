//! The in-memory forum store.
//!
//! [`ForumStore`] knows nothing about the filesystem. It holds every forum
//! and notification, hands out sequence numbers, and counts revisions so a
//! persistence layer can tell when a flush is due. See
//! [`crate::storage::Repository`] for the file-backed wrapper.

use thiserror::Error;

use crate::domain::{
    Discussion, DiscussionPatch, Forum, ForumPatch, Id, NewDiscussion, NewForum, NewNote,
    NewReply, Note, NotePatch, Notification, PostKind, Rating, RatingError, Reply, ReplyPatch,
    Vote,
    poll::{self, PollVote},
};

/// The post a reply belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    /// A note, by id.
    Note(Id),
    /// A discussion, by id.
    Discussion(Id),
}

impl ReplyTarget {
    const fn kind(&self) -> PostKind {
        match self {
            Self::Note(_) => PostKind::Note,
            Self::Discussion(_) => PostKind::Discussion,
        }
    }
}

/// Errors returned by [`ForumStore`] operations.
///
/// A failed operation never leaves a partial change behind.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// No forum has this id.
    #[error("forum {0} not found")]
    ForumNotFound(Id),
    /// The forum has no note with this id.
    #[error("note {note} not found in forum {forum}")]
    NoteNotFound {
        /// The forum that was searched.
        forum: Id,
        /// The missing note.
        note: Id,
    },
    /// The forum has no discussion with this id.
    #[error("discussion {discussion} not found in forum {forum}")]
    DiscussionNotFound {
        /// The forum that was searched.
        forum: Id,
        /// The missing discussion.
        discussion: Id,
    },
    /// The post has no reply with this id.
    #[error("reply {reply} not found in forum {forum}")]
    ReplyNotFound {
        /// The forum that was searched.
        forum: Id,
        /// The missing reply.
        reply: Id,
    },
    /// The discussion exists but is not a poll.
    #[error("discussion {0} is not a poll")]
    NotAPoll(Id),
    /// The poll has no option with this id.
    #[error("poll option {option} not found in discussion {discussion}")]
    PollOptionNotFound {
        /// The poll that was searched.
        discussion: Id,
        /// The missing option.
        option: Id,
    },
    /// No notification has this id.
    #[error("notification {0} not found")]
    NotificationNotFound(Id),
    /// The notification is addressed to a different user.
    #[error("notification {notification} is not addressed to {actor}")]
    NotRecipient {
        /// The notification
        notification: Id,
        /// The user who tried to mark it
        actor: String,
    },
    /// The incoming rating was out of range.
    #[error(transparent)]
    Rating(#[from] RatingError),
}

/// An in-memory collection of forums and the notifications they raise.
///
/// Mutations never perform I/O. Every successful mutation bumps
/// [`ForumStore::revision`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForumStore {
    forums: Vec<Forum>,
    notifications: Vec<Notification>,
    next_seq: u64,
    revision: u64,
}

impl Default for ForumStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ForumStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            forums: Vec::new(),
            notifications: Vec::new(),
            next_seq: 1,
            revision: 0,
        }
    }

    /// Rebuilds a store from persisted parts.
    ///
    /// `next_seq` is raised above every sequence number already present.
    pub(crate) fn from_parts(
        forums: Vec<Forum>,
        notifications: Vec<Notification>,
        next_seq: u64,
    ) -> Self {
        let floor = forums.iter().map(Forum::max_seq).max().unwrap_or(0) + 1;
        Self {
            forums,
            notifications,
            next_seq: next_seq.max(floor),
            revision: 0,
        }
    }

    /// All forums, in creation order.
    #[must_use]
    pub fn forums(&self) -> &[Forum] {
        &self.forums
    }

    /// Looks up a forum by id.
    #[must_use]
    pub fn forum(&self, id: &Id) -> Option<&Forum> {
        self.forums.iter().find(|f| &f.id == id)
    }

    /// Every notification, in the order they were raised.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// The sequence number the next post or reply will receive.
    #[must_use]
    pub const fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// A counter that increases on every successful mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the store holds no forums.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forums.is_empty()
    }

    /// Appends a new, unrated forum with no posts.
    ///
    /// The store does not validate the input; see [`NewForum::validate`].
    pub fn add_forum(&mut self, new: NewForum) -> Id {
        self.add_rated_forum(new, Rating::default())
    }

    /// Appends a new forum that starts with the given rating.
    pub(crate) fn add_rated_forum(&mut self, new: NewForum, rating: Rating) -> Id {
        let mut forum = Forum::create(new);
        forum.rating = rating;
        let id = forum.id.clone();
        tracing::info!("Added forum: {} ({id})", forum.name);
        self.forums.push(forum);
        self.touch();
        id
    }

    /// Appends a note to a forum.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForumNotFound`] if the forum does not exist.
    pub fn add_note(&mut self, forum_id: &Id, new: NewNote) -> Result<Id, StoreError> {
        let seq = self.next_seq;
        let forum = find_forum(&mut self.forums, forum_id)?;

        let note = Note::create(new, seq);
        let id = note.id.clone();
        forum.notes.push(note);

        tracing::info!("Added note {id} to forum {forum_id}");
        self.next_seq += 1;
        self.touch();
        Ok(id)
    }

    /// Prepends a discussion to a forum, so the newest comes first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForumNotFound`] if the forum does not exist.
    pub fn add_discussion(&mut self, forum_id: &Id, new: NewDiscussion) -> Result<Id, StoreError> {
        let seq = self.next_seq;
        let forum = find_forum(&mut self.forums, forum_id)?;

        let discussion = Discussion::create(new, seq);
        let id = discussion.id.clone();
        let is_poll = discussion.is_poll;
        forum.discussions.insert(0, discussion);

        if is_poll {
            tracing::info!("Added poll {id} to forum {forum_id}");
        } else {
            tracing::info!("Added discussion {id} to forum {forum_id}");
        }
        self.next_seq += 1;
        self.touch();
        Ok(id)
    }

    /// Appends a reply to a discussion.
    ///
    /// If the discussion's author is not the replier, they are notified.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum or discussion does not exist.
    pub fn add_reply_to_discussion(
        &mut self,
        forum_id: &Id,
        discussion_id: &Id,
        new: NewReply,
    ) -> Result<Id, StoreError> {
        self.add_reply(forum_id, &ReplyTarget::Discussion(discussion_id.clone()), new)
    }

    /// Appends a reply to a note.
    ///
    /// If the note's author is not the replier, they are notified.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum or note does not exist.
    pub fn add_reply_to_note(
        &mut self,
        forum_id: &Id,
        note_id: &Id,
        new: NewReply,
    ) -> Result<Id, StoreError> {
        self.add_reply(forum_id, &ReplyTarget::Note(note_id.clone()), new)
    }

    /// Appends a reply to the given post.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum or the post does not exist.
    pub fn add_reply(
        &mut self,
        forum_id: &Id,
        target: &ReplyTarget,
        new: NewReply,
    ) -> Result<Id, StoreError> {
        let seq = self.next_seq;
        let forum = find_forum(&mut self.forums, forum_id)?;
        let (replies, post_author) = post_replies(forum, forum_id, target)?;

        let replier = new.author.clone();
        let replier_id = new.author_id.clone();
        let reply = Reply::create(new, seq);
        let id = reply.id.clone();
        replies.push(reply);

        tracing::info!("Added reply {id} to {} in forum {forum_id}", target.kind());

        if post_author != replier_id {
            let post_id = match target {
                ReplyTarget::Note(id) | ReplyTarget::Discussion(id) => id.clone(),
            };
            self.notifications.push(Notification::reply(
                post_author,
                &replier,
                post_id,
                target.kind(),
            ));
        }

        self.next_seq += 1;
        self.touch();
        Ok(id)
    }

    /// Shallow-merges the given fields into a forum.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForumNotFound`] if the forum does not exist.
    pub fn update_forum(&mut self, forum_id: &Id, patch: ForumPatch) -> Result<(), StoreError> {
        let forum = find_forum(&mut self.forums, forum_id)?;
        forum.apply(patch);
        self.next_seq = self.next_seq.max(forum.max_seq() + 1);
        tracing::debug!("Updated forum {forum_id}");
        self.touch();
        Ok(())
    }

    /// Folds a new rating into a forum's running rating.
    ///
    /// The new rating is the mean of the previous rating and `incoming`.
    ///
    /// # Errors
    ///
    /// Returns an error if `incoming` is outside `[0, 5]` or the forum does
    /// not exist.
    pub fn rate_forum(&mut self, forum_id: &Id, incoming: f64) -> Result<Rating, StoreError> {
        let incoming = Rating::new(incoming)?;
        let forum = find_forum(&mut self.forums, forum_id)?;
        forum.rating = forum.rating.blend(incoming);
        let rating = forum.rating;

        tracing::debug!("Rated forum {forum_id}: now {rating}");
        self.touch();
        Ok(rating)
    }

    /// Records a like or dislike on a note.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum or note does not exist.
    pub fn vote_note(&mut self, forum_id: &Id, note_id: &Id, vote: Vote) -> Result<(), StoreError> {
        find_note(&mut self.forums, forum_id, note_id)?.vote(vote);
        tracing::debug!("Recorded {vote} on note {note_id}");
        self.touch();
        Ok(())
    }

    /// Records a like or dislike on a discussion.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum or discussion does not exist.
    pub fn vote_discussion(
        &mut self,
        forum_id: &Id,
        discussion_id: &Id,
        vote: Vote,
    ) -> Result<(), StoreError> {
        find_discussion(&mut self.forums, forum_id, discussion_id)?.vote(vote);
        tracing::debug!("Recorded {vote} on discussion {discussion_id}");
        self.touch();
        Ok(())
    }

    /// Records a like or dislike on a reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum, the post or the reply does not exist.
    pub fn vote_reply(
        &mut self,
        forum_id: &Id,
        target: &ReplyTarget,
        reply_id: &Id,
        vote: Vote,
    ) -> Result<(), StoreError> {
        find_reply(&mut self.forums, forum_id, target, reply_id)?.vote(vote);
        tracing::debug!("Recorded {vote} on reply {reply_id}");
        self.touch();
        Ok(())
    }

    /// Flips the pin state of a note. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum or note does not exist.
    pub fn toggle_pin_note(&mut self, forum_id: &Id, note_id: &Id) -> Result<bool, StoreError> {
        let note = find_note(&mut self.forums, forum_id, note_id)?;
        note.is_pinned = !note.is_pinned;
        let pinned = note.is_pinned;

        tracing::debug!("Toggled pin on note {note_id}: {pinned}");
        self.touch();
        Ok(pinned)
    }

    /// Flips the pin state of a discussion. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum or discussion does not exist.
    pub fn toggle_pin_discussion(
        &mut self,
        forum_id: &Id,
        discussion_id: &Id,
    ) -> Result<bool, StoreError> {
        let discussion = find_discussion(&mut self.forums, forum_id, discussion_id)?;
        discussion.is_pinned = !discussion.is_pinned;
        let pinned = discussion.is_pinned;

        tracing::debug!("Toggled pin on discussion {discussion_id}: {pinned}");
        self.touch();
        Ok(pinned)
    }

    /// Overwrites fields of a note.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum or note does not exist.
    pub fn update_note(
        &mut self,
        forum_id: &Id,
        note_id: &Id,
        patch: NotePatch,
    ) -> Result<(), StoreError> {
        find_note(&mut self.forums, forum_id, note_id)?.apply(patch);
        tracing::debug!("Updated note {note_id}");
        self.touch();
        Ok(())
    }

    /// Overwrites fields of a discussion.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum or discussion does not exist.
    pub fn update_discussion(
        &mut self,
        forum_id: &Id,
        discussion_id: &Id,
        patch: DiscussionPatch,
    ) -> Result<(), StoreError> {
        find_discussion(&mut self.forums, forum_id, discussion_id)?.apply(patch);
        tracing::debug!("Updated discussion {discussion_id}");
        self.touch();
        Ok(())
    }

    /// Overwrites fields of a reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum, the post or the reply does not exist.
    pub fn update_reply(
        &mut self,
        forum_id: &Id,
        target: &ReplyTarget,
        reply_id: &Id,
        patch: ReplyPatch,
    ) -> Result<(), StoreError> {
        find_reply(&mut self.forums, forum_id, target, reply_id)?.apply(patch);
        tracing::debug!("Updated reply {reply_id}");
        self.touch();
        Ok(())
    }

    /// Records `actor`'s vote for a poll option.
    ///
    /// Each actor holds at most one option per poll: a previous vote is
    /// retracted before the new one is recorded. Voting again for the option
    /// already held changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum or discussion does not exist, the
    /// discussion is not a poll, or the option does not exist.
    pub fn vote_poll(
        &mut self,
        forum_id: &Id,
        discussion_id: &Id,
        option_id: &Id,
        actor: &str,
    ) -> Result<PollVote, StoreError> {
        let discussion = find_discussion(&mut self.forums, forum_id, discussion_id)?;
        let options = discussion
            .poll_mut()
            .ok_or_else(|| StoreError::NotAPoll(discussion_id.clone()))?;
        let outcome = poll::cast(options, option_id, actor).ok_or_else(|| {
            StoreError::PollOptionNotFound {
                discussion: discussion_id.clone(),
                option: option_id.clone(),
            }
        })?;

        tracing::debug!("Poll vote by {actor} on {discussion_id}: {outcome:?}");
        if outcome != PollVote::Unchanged {
            self.touch();
        }
        Ok(outcome)
    }

    /// Notifications addressed to `actor`, newest first.
    #[must_use]
    pub fn notifications_for(&self, actor: &str) -> Vec<&Notification> {
        let mut mine: Vec<_> = self
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == actor)
            .collect();
        mine.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        mine
    }

    /// Number of unread notifications addressed to `actor`.
    #[must_use]
    pub fn unread_count(&self, actor: &str) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.user_id == actor && !n.is_read)
            .count()
    }

    /// Marks a single notification addressed to `actor` as read.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotificationNotFound`] if no notification has
    /// this id, or [`StoreError::NotRecipient`] if it is addressed to
    /// someone else.
    pub fn mark_notification_read(&mut self, id: &Id, actor: &str) -> Result<(), StoreError> {
        let notification = self
            .notifications
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| StoreError::NotificationNotFound(id.clone()))?;

        if notification.user_id != actor {
            return Err(StoreError::NotRecipient {
                notification: id.clone(),
                actor: actor.to_string(),
            });
        }

        if !notification.is_read {
            notification.is_read = true;
            self.touch();
        }
        Ok(())
    }

    /// Marks every notification addressed to `actor` as read.
    ///
    /// Returns how many notifications changed.
    pub fn mark_all_read(&mut self, actor: &str) -> usize {
        let mut changed = 0;
        for notification in self
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == actor && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }

        if changed > 0 {
            tracing::debug!("Marked {changed} notifications read for {actor}");
            self.touch();
        }
        changed
    }

    const fn touch(&mut self) {
        self.revision += 1;
    }
}

fn find_forum<'a>(forums: &'a mut [Forum], id: &Id) -> Result<&'a mut Forum, StoreError> {
    forums
        .iter_mut()
        .find(|f| &f.id == id)
        .ok_or_else(|| StoreError::ForumNotFound(id.clone()))
}

fn find_note<'a>(
    forums: &'a mut [Forum],
    forum_id: &Id,
    note_id: &Id,
) -> Result<&'a mut Note, StoreError> {
    find_forum(forums, forum_id)?
        .note_mut(note_id)
        .ok_or_else(|| StoreError::NoteNotFound {
            forum: forum_id.clone(),
            note: note_id.clone(),
        })
}

fn find_discussion<'a>(
    forums: &'a mut [Forum],
    forum_id: &Id,
    discussion_id: &Id,
) -> Result<&'a mut Discussion, StoreError> {
    find_forum(forums, forum_id)?
        .discussion_mut(discussion_id)
        .ok_or_else(|| StoreError::DiscussionNotFound {
            forum: forum_id.clone(),
            discussion: discussion_id.clone(),
        })
}

/// The replies of the targeted post, along with the post author's id.
fn post_replies<'a>(
    forum: &'a mut Forum,
    forum_id: &Id,
    target: &ReplyTarget,
) -> Result<(&'a mut Vec<Reply>, String), StoreError> {
    match target {
        ReplyTarget::Note(note_id) => {
            let note = forum
                .note_mut(note_id)
                .ok_or_else(|| StoreError::NoteNotFound {
                    forum: forum_id.clone(),
                    note: note_id.clone(),
                })?;
            Ok((&mut note.replies, note.author_id.clone()))
        }
        ReplyTarget::Discussion(discussion_id) => {
            let discussion = forum.discussion_mut(discussion_id).ok_or_else(|| {
                StoreError::DiscussionNotFound {
                    forum: forum_id.clone(),
                    discussion: discussion_id.clone(),
                }
            })?;
            Ok((&mut discussion.replies, discussion.author_id.clone()))
        }
    }
}

fn find_reply<'a>(
    forums: &'a mut [Forum],
    forum_id: &Id,
    target: &ReplyTarget,
    reply_id: &Id,
) -> Result<&'a mut Reply, StoreError> {
    let forum = find_forum(forums, forum_id)?;
    let (replies, _) = post_replies(forum, forum_id, target)?;
    replies
        .iter_mut()
        .find(|r| &r.id == reply_id)
        .ok_or_else(|| StoreError::ReplyNotFound {
            forum: forum_id.clone(),
            reply: reply_id.clone(),
        })
}
