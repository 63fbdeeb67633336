use std::path::PathBuf;

use forum_store::{Id, Repository};
use tracing::instrument;

use super::{User, terminal::Colorize};

#[derive(Debug, clap::Parser)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Command {
    /// Only show unread notifications
    #[arg(long)]
    unread: bool,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Debug, clap::Subcommand)]
enum Action {
    /// Mark notifications as read
    Read(Read),
}

#[derive(Debug, clap::Parser)]
struct Read {
    /// The notification to mark
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    id: Option<Id>,

    /// Mark every notification of the current user
    #[arg(long)]
    all: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf, user: &User) -> anyhow::Result<()> {
        match self.action {
            None => list(root, user, self.unread),
            Some(Action::Read(read)) => read.run(root, user),
        }
    }
}

fn list(root: PathBuf, user: &User, unread_only: bool) -> anyhow::Result<()> {
    let repository = Repository::open(root)?;
    let actor = user.resolve(repository.config());
    let store = repository.store();

    let notifications: Vec<_> = store
        .notifications_for(&actor.id)
        .into_iter()
        .filter(|n| !unread_only || !n.is_read)
        .collect();

    if notifications.is_empty() {
        println!("{}", "No notifications".dim());
        return Ok(());
    }

    for notification in notifications {
        let marker = if notification.is_read {
            " ".to_string()
        } else {
            "●".info()
        };
        println!(
            "{marker} {}  {}  {}",
            notification.message,
            notification
                .timestamp
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .dim(),
            notification.id.as_str().dim()
        );
    }
    println!(
        "\n{} unread",
        store.unread_count(&actor.id).to_string().info()
    );
    Ok(())
}

impl Read {
    fn run(self, root: PathBuf, user: &User) -> anyhow::Result<()> {
        let mut repository = Repository::open(root)?;
        let actor = user.resolve(repository.config());

        let message = match (self.all, self.id) {
            (true, _) => {
                let count = repository.store_mut().mark_all_read(&actor.id);
                format!("Marked {count} notifications as read")
            }
            (false, Some(id)) => {
                repository.store_mut().mark_notification_read(&id, &actor.id)?;
                format!("Marked {id} as read")
            }
            (false, None) => anyhow::bail!("pass a notification id or --all"),
        };
        repository.flush()?;

        println!("{}", message.success());
        Ok(())
    }
}
