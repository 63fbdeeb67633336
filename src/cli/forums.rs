use std::path::PathBuf;

use forum_store::{
    Id, Repository,
    domain::{ForumPatch, NewForum},
};
use tracing::instrument;

use super::terminal::Colorize;

mod show;

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Create a forum
    Add(Add),

    /// List all forums
    List,

    /// Show a forum with its notes and discussions
    Show(show::Command),

    /// Rate a forum from 0 to 5
    Rate(Rate),

    /// Change a forum's name, description or tags
    Update(Update),
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Add(command) => command.run(root),
            Self::List => list(root),
            Self::Show(command) => command.run(root),
            Self::Rate(command) => command.run(root),
            Self::Update(command) => command.run(root),
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// The forum name
    #[arg(long)]
    name: String,

    /// What the forum is about
    #[arg(long)]
    description: String,

    /// A topic tag (repeatable)
    #[arg(long = "tag", value_name = "TAG", required = true)]
    tags: Vec<String>,
}

impl Add {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut repository = Repository::open(root)?;

        let new = NewForum {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            tags: self
                .tags
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        };
        new.validate()?;

        let name = new.name.clone();
        let id = repository.store_mut().add_forum(new);
        repository.flush()?;

        println!("{}", format!("Added forum {name} ({id})").success());
        Ok(())
    }
}

fn list(root: PathBuf) -> anyhow::Result<()> {
    let repository = Repository::open(root)?;
    let forums = repository.store().forums();

    if forums.is_empty() {
        println!("{}", "No forums yet".dim());
        return Ok(());
    }

    for forum in forums {
        println!(
            "{}  {}  {}  {}",
            forum.id.as_str().dim(),
            forum.name,
            format!("★ {}", forum.rating).highlight(),
            forum.tags.join(", ").info()
        );
    }
    Ok(())
}

#[derive(Debug, clap::Parser)]
pub struct Rate {
    /// The forum to rate
    forum: Id,

    /// A rating between 0 and 5
    rating: f64,
}

impl Rate {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut repository = Repository::open(root)?;
        let rating = repository.store_mut().rate_forum(&self.forum, self.rating)?;
        repository.flush()?;

        println!("Forum {} is now rated {}", self.forum, rating.to_string().highlight());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Update {
    /// The forum to update
    forum: Id,

    /// A new name
    #[arg(long)]
    name: Option<String>,

    /// A new description
    #[arg(long)]
    description: Option<String>,

    /// Replace the tags (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
}

impl Update {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let patch = ForumPatch {
            name: non_blank(self.name, "name")?,
            description: non_blank(self.description, "description")?,
            tags: (!self.tags.is_empty()).then_some(self.tags),
            ..ForumPatch::default()
        };

        let mut repository = Repository::open(root)?;
        repository.store_mut().update_forum(&self.forum, patch)?;
        repository.flush()?;

        println!("Updated forum {}", self.forum);
        Ok(())
    }
}

fn non_blank(value: Option<String>, field: &str) -> anyhow::Result<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => anyhow::bail!("{field} must not be empty"),
        other => Ok(other),
    }
}
