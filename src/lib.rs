//! Community forum store
//!
//! Forums hold notes and discussions, which hold replies. The whole
//! collection lives in memory and is persisted as a single JSON snapshot.

pub mod domain;
pub use domain::{
    Attachment, Config, Discussion, Forum, ForumStore, Id, Note, PollOption, Reply, ReplyTarget,
    StoreError, Vote,
};

/// Filesystem persistence for the forum store.
pub mod storage;
pub use storage::Repository;
