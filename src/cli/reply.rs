use std::path::PathBuf;

use forum_store::{Id, ReplyTarget, Repository, Vote, domain::ReplyPatch};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Like or dislike a reply
    Vote(VoteOn),

    /// Change a reply's content
    Edit(Edit),
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut repository = Repository::open(root)?;

        let message = match self {
            Self::Vote(command) => {
                let target = command.post.target()?;
                repository
                    .store_mut()
                    .vote_reply(&command.forum, &target, &command.reply, command.vote)?;
                format!("Recorded {} on reply {}", command.vote, command.reply)
            }
            Self::Edit(command) => {
                let target = command.post.target()?;
                repository.store_mut().update_reply(
                    &command.forum,
                    &target,
                    &command.reply,
                    ReplyPatch {
                        content: Some(command.content),
                    },
                )?;
                format!("Updated reply {}", command.reply)
            }
        };
        repository.flush()?;

        println!("{}", message.success());
        Ok(())
    }
}

/// The post a reply sits under.
#[derive(Debug, Clone, clap::Args)]
#[group(required = true, multiple = false)]
struct Post {
    /// The reply is under this note
    #[arg(long)]
    note: Option<Id>,

    /// The reply is under this discussion
    #[arg(long)]
    discussion: Option<Id>,
}

impl Post {
    fn target(&self) -> anyhow::Result<ReplyTarget> {
        self.note
            .clone()
            .map(ReplyTarget::Note)
            .or_else(|| self.discussion.clone().map(ReplyTarget::Discussion))
            .ok_or_else(|| anyhow::anyhow!("one of --note or --discussion is required"))
    }
}

#[derive(Debug, clap::Parser)]
pub struct VoteOn {
    /// The forum holding the post
    forum: Id,

    #[command(flatten)]
    post: Post,

    /// The reply to vote on
    reply: Id,

    /// `like` or `dislike`
    vote: Vote,
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// The forum holding the post
    forum: Id,

    #[command(flatten)]
    post: Post,

    /// The reply to edit
    reply: Id,

    /// New text
    #[arg(long)]
    content: String,
}

#[cfg(test)]
mod tests {
    use forum_store::{
        Repository,
        domain::{NewForum, NewNote, NewReply},
    };
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn vote_and_edit_reply_under_note() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let mut repository = Repository::open(root.clone()).unwrap();
        let store = repository.store_mut();
        let forum = store.add_forum(NewForum::default());
        let note = store.add_note(&forum, NewNote::default()).unwrap();
        let reply = store
            .add_reply_to_note(
                &forum,
                &note,
                NewReply {
                    content: "first".to_string(),
                    ..NewReply::default()
                },
            )
            .unwrap();
        repository.flush().unwrap();

        let post = Post {
            note: Some(note.clone()),
            discussion: None,
        };
        Command::Vote(VoteOn {
            forum: forum.clone(),
            post: post.clone(),
            reply: reply.clone(),
            vote: Vote::Like,
        })
        .run(root.clone())
        .unwrap();
        Command::Edit(Edit {
            forum: forum.clone(),
            post,
            reply,
            content: "edited".to_string(),
        })
        .run(root.clone())
        .unwrap();

        let repository = Repository::open(root).unwrap();
        let reply = &repository.store().forum(&forum).unwrap().note(&note).unwrap().replies[0];
        assert_eq!(reply.likes, 1);
        assert_eq!(reply.content, "edited");
    }

    #[test]
    fn wrong_post_kind_is_not_found() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let mut repository = Repository::open(root.clone()).unwrap();
        let store = repository.store_mut();
        let forum = store.add_forum(NewForum::default());
        let note = store.add_note(&forum, NewNote::default()).unwrap();
        let reply = store
            .add_reply_to_note(&forum, &note, NewReply::default())
            .unwrap();
        repository.flush().unwrap();

        let result = Command::Vote(VoteOn {
            forum,
            post: Post {
                note: None,
                discussion: Some(note),
            },
            reply,
            vote: Vote::Like,
        })
        .run(root);
        assert!(result.is_err());
    }

    #[test]
    fn cli_requires_a_post() {
        use clap::Parser;

        use crate::cli::Cli;

        assert!(Cli::try_parse_from(["forum", "reply", "vote", "f", "r", "like"]).is_err());
        assert!(
            Cli::try_parse_from(["forum", "reply", "vote", "f", "--note", "n", "r", "like"])
                .is_ok()
        );
    }
}
