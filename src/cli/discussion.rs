use std::path::PathBuf;

use forum_store::{
    Id, Repository, Vote,
    domain::{DiscussionPatch, NewDiscussion, NewReply},
};
use tracing::instrument;

use super::{Attachments, User, ensure_content, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Start a discussion, or a poll when options are given
    Add(Add),

    /// Reply to a discussion
    Reply(Reply),

    /// Like or dislike a discussion
    Vote(VoteOn),

    /// Pin or unpin a discussion
    Pin(Pin),

    /// Change a discussion's content
    Edit(Edit),
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf, user: &User) -> anyhow::Result<()> {
        let mut repository = Repository::open(root)?;

        let message = match self {
            Self::Add(command) => command.run(&mut repository, user)?,
            Self::Reply(command) => command.run(&mut repository, user)?,
            Self::Vote(command) => command.run(&mut repository)?,
            Self::Pin(command) => command.run(&mut repository)?,
            Self::Edit(command) => command.run(&mut repository)?,
        };
        repository.flush()?;

        println!("{}", message.success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// The forum to post in
    forum: Id,

    /// The discussion text, or the poll question
    #[arg(long, default_value = "")]
    content: String,

    /// A poll choice (repeatable; at least two make a poll)
    #[arg(long = "option", value_name = "TEXT")]
    options: Vec<String>,

    #[command(flatten)]
    attachments: Attachments,
}

impl Add {
    fn run(self, repository: &mut Repository, user: &User) -> anyhow::Result<String> {
        let actor = user.resolve(repository.config());
        let attachments = self.attachments.collect()?;

        let new = if self.options.is_empty() {
            ensure_content(&self.content, &attachments)?;
            NewDiscussion {
                content: self.content,
                author: actor.name,
                author_id: actor.id,
                attachments,
                poll_options: None,
            }
        } else {
            NewDiscussion {
                attachments,
                ..NewDiscussion::poll(self.content, self.options, actor.name, actor.id)?
            }
        };

        let is_poll = new.poll_options.is_some();
        let id = repository.store_mut().add_discussion(&self.forum, new)?;
        let kind = if is_poll { "poll" } else { "discussion" };
        Ok(format!("Started {kind} {id}"))
    }
}

#[derive(Debug, clap::Parser)]
pub struct Reply {
    /// The forum holding the discussion
    forum: Id,

    /// The discussion to reply to
    discussion: Id,

    /// The reply text
    #[arg(long, default_value = "")]
    content: String,

    #[command(flatten)]
    attachments: Attachments,
}

impl Reply {
    fn run(self, repository: &mut Repository, user: &User) -> anyhow::Result<String> {
        let attachments = self.attachments.collect()?;
        ensure_content(&self.content, &attachments)?;

        let actor = user.resolve(repository.config());
        let id = repository.store_mut().add_reply_to_discussion(
            &self.forum,
            &self.discussion,
            NewReply {
                content: self.content,
                author: actor.name,
                author_id: actor.id,
                attachments,
            },
        )?;
        Ok(format!("Added reply {id}"))
    }
}

#[derive(Debug, clap::Parser)]
pub struct VoteOn {
    /// The forum holding the discussion
    forum: Id,

    /// The discussion to vote on
    discussion: Id,

    /// `like` or `dislike`
    vote: Vote,
}

impl VoteOn {
    fn run(self, repository: &mut Repository) -> anyhow::Result<String> {
        repository
            .store_mut()
            .vote_discussion(&self.forum, &self.discussion, self.vote)?;
        Ok(format!("Recorded {} on discussion {}", self.vote, self.discussion))
    }
}

#[derive(Debug, clap::Parser)]
pub struct Pin {
    /// The forum holding the discussion
    forum: Id,

    /// The discussion to pin or unpin
    discussion: Id,
}

impl Pin {
    fn run(self, repository: &mut Repository) -> anyhow::Result<String> {
        let pinned = repository
            .store_mut()
            .toggle_pin_discussion(&self.forum, &self.discussion)?;
        let verb = if pinned { "Pinned" } else { "Unpinned" };
        Ok(format!("{verb} discussion {}", self.discussion))
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// The forum holding the discussion
    forum: Id,

    /// The discussion to edit
    discussion: Id,

    /// New text
    #[arg(long)]
    content: String,
}

impl Edit {
    fn run(self, repository: &mut Repository) -> anyhow::Result<String> {
        repository.store_mut().update_discussion(
            &self.forum,
            &self.discussion,
            DiscussionPatch {
                content: Some(self.content),
                is_pinned: None,
            },
        )?;
        Ok(format!("Updated discussion {}", self.discussion))
    }
}
