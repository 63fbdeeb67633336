use std::path::PathBuf;

mod discussion;
mod forums;
mod init;
mod note;
mod notifications;
mod poll;
mod reply;
mod terminal;

use clap::ArgAction;
use forum_store::{Attachment, Config};

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding the forum store
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(flatten)]
    user: User,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run(self.root, &self.user)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialise a new forum store
    Init(init::Command),

    /// Create, list, inspect and rate forums
    #[command(subcommand)]
    Forums(forums::Command),

    /// Work with the notes of a forum
    #[command(subcommand)]
    Note(note::Command),

    /// Work with the discussions of a forum
    #[command(subcommand)]
    Discussion(discussion::Command),

    /// Vote in polls
    #[command(subcommand)]
    Poll(poll::Command),

    /// Vote on or edit replies
    #[command(subcommand)]
    Reply(reply::Command),

    /// Show or acknowledge notifications for the current user
    Notifications(notifications::Command),
}

impl Command {
    fn run(self, root: PathBuf, user: &User) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(root),
            Self::Forums(command) => command.run(root),
            Self::Note(command) => command.run(root, user),
            Self::Discussion(command) => command.run(root, user),
            Self::Poll(command) => command.run(root, user),
            Self::Reply(command) => command.run(root),
            Self::Notifications(command) => command.run(root, user),
        }
    }
}

/// The user the CLI acts as.
///
/// Flags take precedence over the store configuration.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct User {
    /// Identifier of the acting user
    #[arg(long, global = true)]
    user_id: Option<String>,

    /// Display name of the acting user
    #[arg(long, global = true)]
    user_name: Option<String>,
}

impl User {
    const ANONYMOUS: &'static str = "anonymous";

    fn resolve(&self, config: &Config) -> Actor {
        let id = self
            .user_id
            .clone()
            .or_else(|| config.user_id.clone())
            .unwrap_or_else(|| Self::ANONYMOUS.to_string());
        let name = self
            .user_name
            .clone()
            .or_else(|| config.user_name.clone())
            .unwrap_or_else(|| Self::ANONYMOUS.to_string());
        Actor { id, name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Actor {
    id: String,
    name: String,
}

/// Files and links to attach to a new post or reply.
#[derive(Debug, Clone, Default, clap::Args)]
struct Attachments {
    /// Attach an image or PDF file (repeatable)
    #[arg(long = "attach", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Attach a link (repeatable)
    #[arg(long = "link", value_name = "URL")]
    links: Vec<String>,
}

impl Attachments {
    fn collect(&self) -> anyhow::Result<Vec<Attachment>> {
        let mut attachments = Vec::with_capacity(self.files.len() + self.links.len());
        for path in &self.files {
            attachments.push(Attachment::from_file(path)?);
        }
        for link in &self.links {
            attachments.push(Attachment::link(link)?);
        }
        Ok(attachments)
    }
}

/// Rejects posts with neither text nor attachments.
fn ensure_content(content: &str, attachments: &[Attachment]) -> anyhow::Result<()> {
    if content.trim().is_empty() && attachments.is_empty() {
        anyhow::bail!("content must not be empty unless something is attached");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        config.user_id = Some("u1".to_string());
        config.user_name = Some("Ann".to_string());
        let user = User {
            user_id: Some("u2".to_string()),
            user_name: None,
        };

        let actor = user.resolve(&config);
        assert_eq!(actor.id, "u2");
        assert_eq!(actor.name, "Ann");
    }

    #[test]
    fn anonymous_without_config() {
        let actor = User::default().resolve(&Config::default());
        assert_eq!(actor.id, "anonymous");
        assert_eq!(actor.name, "anonymous");
    }

    #[test]
    fn blank_post_without_attachments_is_rejected() {
        assert!(ensure_content("  ", &[]).is_err());
        assert!(ensure_content("hi", &[]).is_ok());

        let link = Attachment::link("https://example.com/a").unwrap();
        assert!(ensure_content("", &[link]).is_ok());
    }

    #[test]
    fn cli_parses_nested_commands() {
        use clap::Parser;

        let cli = Cli::try_parse_from([
            "forum", "-vv", "--root", "/tmp/x", "--user-id", "u1", "note", "vote", "f1", "n1",
            "like",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.user.user_id.as_deref(), Some("u1"));
        assert!(matches!(cli.command, Command::Note(_)));
    }
}
