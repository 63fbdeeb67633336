use std::path::PathBuf;

use forum_store::{
    Id, Repository, Vote,
    domain::{NewNote, NewReply, NotePatch},
};
use tracing::instrument;

use super::{Attachments, User, ensure_content, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Post a note to a forum
    Add(Add),

    /// Reply to a note
    Reply(Reply),

    /// Like or dislike a note
    Vote(VoteOn),

    /// Pin or unpin a note
    Pin(Pin),

    /// Change a note's title or content
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

    /// The note's heading
    #[arg(long)]
    title: String,

    /// The note's body text
    #[arg(long, default_value = "")]
    content: String,

    #[command(flatten)]
    attachments: Attachments,
}

impl Add {
    fn run(self, repository: &mut Repository, user: &User) -> anyhow::Result<String> {
        if self.title.trim().is_empty() {
            anyhow::bail!("title must not be empty");
        }
        let attachments = self.attachments.collect()?;
        ensure_content(&self.content, &attachments)?;

        let actor = user.resolve(repository.config());
        let id = repository.store_mut().add_note(
            &self.forum,
            NewNote {
                title: self.title,
                content: self.content,
                author: actor.name,
                author_id: actor.id,
                attachments,
            },
        )?;
        Ok(format!("Added note {id}"))
    }
}

#[derive(Debug, clap::Parser)]
pub struct Reply {
    /// The forum holding the note
    forum: Id,

    /// The note to reply to
    note: Id,

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
        let id = repository.store_mut().add_reply_to_note(
            &self.forum,
            &self.note,
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
    /// The forum holding the note
    forum: Id,

    /// The note to vote on
    note: Id,

    /// `like` or `dislike`
    vote: Vote,
}

impl VoteOn {
    fn run(self, repository: &mut Repository) -> anyhow::Result<String> {
        repository
            .store_mut()
            .vote_note(&self.forum, &self.note, self.vote)?;
        Ok(format!("Recorded {} on note {}", self.vote, self.note))
    }
}

#[derive(Debug, clap::Parser)]
pub struct Pin {
    /// The forum holding the note
    forum: Id,

    /// The note to pin or unpin
    note: Id,
}

impl Pin {
    fn run(self, repository: &mut Repository) -> anyhow::Result<String> {
        let pinned = repository
            .store_mut()
            .toggle_pin_note(&self.forum, &self.note)?;
        let verb = if pinned { "Pinned" } else { "Unpinned" };
        Ok(format!("{verb} note {}", self.note))
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// The forum holding the note
    forum: Id,

    /// The note to edit
    note: Id,

    /// A new heading
    #[arg(long)]
    title: Option<String>,

    /// New body text
    #[arg(long)]
    content: Option<String>,
}

impl Edit {
    fn run(self, repository: &mut Repository) -> anyhow::Result<String> {
        if self.title.is_none() && self.content.is_none() {
            anyhow::bail!("nothing to change: pass --title and/or --content");
        }
        repository.store_mut().update_note(
            &self.forum,
            &self.note,
            NotePatch {
                title: self.title,
                content: self.content,
                is_pinned: None,
            },
        )?;
        Ok(format!("Updated note {}", self.note))
    }
}
