//! JSON snapshots of a [`ForumStore`].
//!
//! A snapshot wraps the store state in an envelope carrying a format
//! version:
//!
//! ```json
//! { "state": { "forums": [], "notifications": [], "nextSeq": 1 }, "version": 1 }
//! ```
//!
//! Version 0 is the shape written by the browser client under the
//! `forum-storage` key. It has no sequence numbers and no notifications;
//! sequence numbers are reconstructed from timestamps on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Forum, ForumStore, Notification};

/// The snapshot format version written by this crate.
pub const CURRENT_VERSION: u32 = 1;

/// The storage key used by the browser client, and the default file stem.
pub const STORAGE_KEY: &str = "forum-storage";

#[derive(Debug, Deserialize)]
struct Envelope {
    state: State,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct State {
    #[serde(default)]
    forums: Vec<Forum>,
    #[serde(default)]
    notifications: Vec<Notification>,
    #[serde(default)]
    next_seq: u64,
}

/// A borrowed view of the store used for serialisation without cloning.
#[derive(Debug, Serialize)]
struct EnvelopeRef<'a> {
    state: StateRef<'a>,
    version: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StateRef<'a> {
    forums: &'a [Forum],
    notifications: &'a [Notification],
    next_seq: u64,
}

/// Errors raised while decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The content is not a valid snapshot.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    /// The snapshot was written by a newer, unknown format.
    #[error("unsupported snapshot version {0} (expected at most {CURRENT_VERSION})")]
    UnsupportedVersion(u32),
}

/// Serialises the store to a snapshot.
///
/// # Errors
///
/// Returns an error if serialisation fails.
pub fn to_json(store: &ForumStore, pretty: bool) -> Result<String, serde_json::Error> {
    let envelope = EnvelopeRef {
        state: StateRef {
            forums: store.forums(),
            notifications: store.notifications(),
            next_seq: store.next_seq(),
        },
        version: CURRENT_VERSION,
    };

    if pretty {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string(&envelope)
    }
}

/// Decodes a snapshot, migrating older versions.
///
/// # Errors
///
/// Returns an error if the content is malformed or has an unknown version.
pub fn from_json(content: &str) -> Result<ForumStore, SnapshotError> {
    let Envelope { state, version } = serde_json::from_str(content)?;

    let State {
        mut forums,
        notifications,
        next_seq,
    } = state;

    match version {
        0 => {
            tracing::debug!("Migrating legacy snapshot with {} forums", forums.len());
            assign_sequence_numbers(&mut forums);
        }
        CURRENT_VERSION => {}
        other => return Err(SnapshotError::UnsupportedVersion(other)),
    }

    Ok(ForumStore::from_parts(forums, notifications, next_seq))
}

/// Numbers every post and reply by ascending timestamp.
///
/// Ties keep creation order. Discussions are stored newest first, so they
/// are visited in reverse.
fn assign_sequence_numbers(forums: &mut [Forum]) {
    let mut slots: Vec<(DateTime<Utc>, &mut u64)> = Vec::new();

    for forum in forums.iter_mut() {
        for note in &mut forum.notes {
            slots.push((note.timestamp, &mut note.seq));
            for reply in &mut note.replies {
                slots.push((reply.timestamp, &mut reply.seq));
            }
        }
        for discussion in forum.discussions.iter_mut().rev() {
            slots.push((discussion.timestamp, &mut discussion.seq));
            for reply in &mut discussion.replies {
                slots.push((reply.timestamp, &mut reply.seq));
            }
        }
    }

    slots.sort_by_key(|(timestamp, _)| *timestamp);
    for (seq, (_, slot)) in (1..).zip(slots) {
        *slot = seq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Attachment, NewDiscussion, NewForum, NewNote, NewReply, ReplyTarget, Vote,
    };

    const LEGACY: &str = r#"{
        "state": {
            "forums": [
                {
                    "id": "1",
                    "name": "Web Development",
                    "description": "Discuss modern web development practices and technologies",
                    "tags": ["React", "NextJS", "Frontend"],
                    "rating": 4.5,
                    "notes": [
                        {
                            "id": "1712000000000",
                            "title": "Hooks",
                            "content": "useEffect pitfalls",
                            "author": "Ann",
                            "authorId": "u1",
                            "timestamp": "2024-04-01T10:00:00.000Z",
                            "replies": [
                                {
                                    "id": "1712000500000",
                                    "content": "Thanks!",
                                    "author": "Bea",
                                    "authorId": "u2",
                                    "timestamp": "2024-04-01T12:00:00.000Z",
                                    "likes": 2,
                                    "dislikes": 0,
                                    "attachments": []
                                }
                            ],
                            "likes": 1,
                            "dislikes": 0,
                            "attachments": [
                                { "id": "k2j3", "type": "link", "url": "https://react.dev/learn", "name": "learn" }
                            ],
                            "isPinned": true
                        }
                    ],
                    "discussions": [
                        {
                            "id": "1712000900000",
                            "content": "Best framework?",
                            "author": "Cy",
                            "authorId": "u3",
                            "timestamp": "2024-04-02T09:00:00.000Z",
                            "replies": [],
                            "likes": 0,
                            "dislikes": 0,
                            "attachments": [],
                            "isPinned": false,
                            "isPoll": true,
                            "pollOptions": [
                                { "id": "a", "text": "React", "votes": 1, "voters": ["u1"] },
                                { "id": "b", "text": "Svelte", "votes": 0, "voters": [] }
                            ]
                        },
                        {
                            "id": "1712000100000",
                            "content": "Hello all",
                            "author": "Ann",
                            "authorId": "u1",
                            "timestamp": "2024-04-01T11:00:00.000Z",
                            "replies": [],
                            "likes": 0,
                            "dislikes": 0,
                            "attachments": [],
                            "isPinned": false
                        }
                    ]
                },
                {
                    "id": "2",
                    "name": "Machine Learning",
                    "description": "Share ML/AI knowledge and resources",
                    "tags": ["AI", "Python", "Data Science"],
                    "rating": 4.8,
                    "notes": [],
                    "discussions": []
                }
            ]
        },
        "version": 0
    }"#;

    fn populated_store() -> ForumStore {
        let mut store = ForumStore::new();
        let forum = store.add_forum(NewForum {
            name: "Rust".to_string(),
            description: "Systems programming".to_string(),
            tags: vec!["rust".to_string(), "systems".to_string()],
        });
        store.rate_forum(&forum, 4.0).unwrap();

        let note = store
            .add_note(
                &forum,
                NewNote {
                    title: "Ownership".to_string(),
                    content: "Borrowing rules".to_string(),
                    author: "Ann".to_string(),
                    author_id: "u1".to_string(),
                    attachments: vec![Attachment::link("https://doc.rust-lang.org/book/").unwrap()],
                },
            )
            .unwrap();
        store.toggle_pin_note(&forum, &note).unwrap();
        let reply = store
            .add_reply_to_note(
                &forum,
                &note,
                NewReply {
                    content: "Great".to_string(),
                    author: "Bea".to_string(),
                    author_id: "u2".to_string(),
                    attachments: Vec::new(),
                },
            )
            .unwrap();
        store
            .vote_reply(&forum, &ReplyTarget::Note(note), &reply, Vote::Like)
            .unwrap();

        let poll = store
            .add_discussion(
                &forum,
                NewDiscussion::poll(
                    "Edition?".to_string(),
                    ["2021".to_string(), "2024".to_string()],
                    "Cy".to_string(),
                    "u3".to_string(),
                )
                .unwrap(),
            )
            .unwrap();
        let option = store.forum(&forum).unwrap().discussion(&poll).unwrap().poll().unwrap()[1]
            .id
            .clone();
        store.vote_poll(&forum, &poll, &option, "u1").unwrap();

        store
    }

    #[test]
    fn round_trip_reproduces_store() {
        let store = populated_store();

        for pretty in [true, false] {
            let json = to_json(&store, pretty).unwrap();
            let loaded = from_json(&json).unwrap();

            assert_eq!(loaded.forums(), store.forums());
            assert_eq!(loaded.notifications(), store.notifications());
            assert_eq!(loaded.next_seq(), store.next_seq());
        }
    }

    #[test]
    fn snapshot_uses_camel_case_envelope() {
        let json: serde_json::Value =
            serde_json::from_str(&to_json(&populated_store(), false).unwrap()).unwrap();

        assert_eq!(json["version"], CURRENT_VERSION);
        let note = &json["state"]["forums"][0]["notes"][0];
        assert_eq!(note["authorId"], "u1");
        assert_eq!(note["isPinned"], true);
        assert_eq!(note["attachments"][0]["type"], "link");
        assert!(json["state"]["nextSeq"].is_u64());
        assert_eq!(json["state"]["notifications"][0]["userId"], "u1");
    }

    #[test]
    fn legacy_snapshot_loads() {
        let store = from_json(LEGACY).unwrap();

        assert_eq!(store.forums().len(), 2);
        let web = &store.forums()[0];
        assert_eq!(web.id, "1");
        assert!((web.rating.get() - 4.5).abs() < f64::EPSILON);
        assert!(web.notes[0].is_pinned);
        assert_eq!(web.notes[0].attachments[0].name, "learn");

        let poll = web.discussions[0].poll().unwrap();
        assert_eq!(poll[0].voters, vec!["u1".to_string()]);
        assert!(web.discussions[1].poll().is_none());
        assert!(store.notifications().is_empty());
    }

    #[test]
    fn legacy_sequence_numbers_follow_timestamps() {
        let store = from_json(LEGACY).unwrap();
        let web = &store.forums()[0];

        // note 10:00, older discussion 11:00, reply 12:00, newer discussion next day
        assert_eq!(web.notes[0].seq, 1);
        assert_eq!(web.discussions[1].seq, 2);
        assert_eq!(web.notes[0].replies[0].seq, 3);
        assert_eq!(web.discussions[0].seq, 4);
        assert_eq!(store.next_seq(), 5);

        let order: Vec<_> = web
            .discussions_by_priority()
            .iter()
            .map(|d| d.id.as_str().to_string())
            .collect();
        assert_eq!(order, vec!["1712000900000", "1712000100000"]);
    }

    #[test]
    fn missing_version_is_legacy() {
        let store = from_json(r#"{"state":{"forums":[]}}"#).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.next_seq(), 1);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let error = from_json(r#"{"state":{"forums":[]},"version":7}"#).unwrap_err();
        assert!(matches!(error, SnapshotError::UnsupportedVersion(7)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(from_json("{not json"), Err(SnapshotError::Json(_))));
    }
}
