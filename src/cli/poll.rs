use std::path::PathBuf;

use forum_store::{Id, Repository, domain::PollVote};
use tracing::instrument;

use super::{User, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Vote for a poll option as the current user
    ///
    /// A previous vote on the same poll is moved to the new option.
    Vote(Vote),
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf, user: &User) -> anyhow::Result<()> {
        match self {
            Self::Vote(command) => command.run(root, user),
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Vote {
    /// The forum holding the poll
    forum: Id,

    /// The poll discussion
    discussion: Id,

    /// The option to vote for
    option: Id,
}

impl Vote {
    fn run(self, root: PathBuf, user: &User) -> anyhow::Result<()> {
        let mut repository = Repository::open(root)?;
        let actor = user.resolve(repository.config());

        let outcome = repository.store_mut().vote_poll(
            &self.forum,
            &self.discussion,
            &self.option,
            &actor.id,
        )?;
        repository.flush()?;

        let message = match outcome {
            PollVote::Cast => "Vote recorded",
            PollVote::Changed => "Vote moved",
            PollVote::Unchanged => "Already voted for this option",
        };
        println!("{}", message.success());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use forum_store::{
        Repository,
        domain::{NewDiscussion, NewForum},
    };
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn revote_moves_the_single_vote() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let mut repository = Repository::open(root.clone()).unwrap();
        let store = repository.store_mut();
        let forum = store.add_forum(NewForum::default());
        let poll = store
            .add_discussion(
                &forum,
                NewDiscussion::poll(
                    "Q".to_string(),
                    ["A".to_string(), "B".to_string()],
                    "Cy".to_string(),
                    "u3".to_string(),
                )
                .unwrap(),
            )
            .unwrap();
        let options: Vec<Id> = store
            .forum(&forum)
            .unwrap()
            .discussion(&poll)
            .unwrap()
            .poll()
            .unwrap()
            .iter()
            .map(|o| o.id.clone())
            .collect();
        repository.flush().unwrap();

        let user = User {
            user_id: Some("u1".to_string()),
            user_name: None,
        };
        for option in [&options[0], &options[1], &options[1]] {
            Vote {
                forum: forum.clone(),
                discussion: poll.clone(),
                option: option.clone(),
            }
            .run(root.clone(), &user)
            .unwrap();
        }

        let repository = Repository::open(root).unwrap();
        let discussion = repository
            .store()
            .forum(&forum)
            .unwrap()
            .discussion(&poll)
            .unwrap();
        assert_eq!(discussion.total_votes(), 1);
        assert_eq!(discussion.voted_option("u1").unwrap().id, options[1]);
    }

    #[test]
    fn voting_on_plain_discussion_fails() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let mut repository = Repository::open(root.clone()).unwrap();
        let forum = repository.store_mut().add_forum(NewForum::default());
        let discussion = repository
            .store_mut()
            .add_discussion(&forum, NewDiscussion::default())
            .unwrap();
        repository.flush().unwrap();

        let result = Vote {
            forum,
            discussion,
            option: Id::from("a"),
        }
        .run(root, &User::default());
        assert!(result.is_err());
    }
}
