//! Domain models for the forum store.
//!
//! This module contains the forum aggregate and everything nested inside it,
//! the in-memory [`ForumStore`], and configuration.

mod attachment;
pub use attachment::{Attachment, AttachmentError, AttachmentKind};

mod config;
pub use config::Config;

/// Forum aggregate root.
pub mod forum;
pub use forum::{Forum, ForumPatch, NewForum, ValidationError};

mod id;
pub use id::Id;

mod notification;
pub use notification::{Notification, PostKind};

mod poll;
pub use poll::{PollOption, PollVote};

pub mod post;
pub use post::{Discussion, DiscussionPatch, NewDiscussion, NewNote, Note, NotePatch, Vote};

mod rating;
pub use rating::{Rating, RatingError};

mod reply;
pub use reply::{NewReply, Reply, ReplyPatch};

pub mod store;
pub use store::{ForumStore, ReplyTarget, StoreError};
